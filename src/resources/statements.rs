//! Statements for each resource operation

use crate::core::filter::{IdSet, IncidentFilter};
use crate::core::query::{Comparison, SelectBuilder, SortOrder, SqlValue, Statement};
use crate::core::record::Incident;

const SELECT_CODES: &str = "SELECT code, incident_type AS type FROM Codes";

const SELECT_NEIGHBORHOODS: &str =
    "SELECT neighborhood_number AS id, neighborhood_name AS name FROM Neighborhoods";

const SELECT_INCIDENTS: &str = "SELECT case_number, date_time, code, incident, police_grid, \
     neighborhood_number, block FROM Incidents";

/// Codes restricted to `codes`, highest code first
pub fn list_codes(codes: &IdSet) -> Statement {
    SelectBuilder::new(SELECT_CODES)
        .filter_in("code", codes)
        .order_by("code", SortOrder::Desc)
        .build()
}

/// Neighborhoods restricted to `ids`, lowest number first
pub fn list_neighborhoods(ids: &IdSet) -> Statement {
    SelectBuilder::new(SELECT_NEIGHBORHOODS)
        .filter_in("neighborhood_number", ids)
        .order_by("neighborhood_number", SortOrder::Asc)
        .build()
}

/// Incidents matching `filter`, newest first
pub fn list_incidents(filter: &IncidentFilter) -> Statement {
    let mut builder = SelectBuilder::new(SELECT_INCIDENTS);

    if let Some(lower) = filter.lower_bound() {
        builder = builder.filter_cmp("date_time", Comparison::Gte, lower);
    }
    if let Some(upper) = filter.upper_bound() {
        builder = builder.filter_cmp("date_time", Comparison::Lt, upper);
    }

    builder
        .filter_in("code", &filter.codes)
        .filter_in("police_grid", &filter.grids)
        .filter_in("neighborhood_number", &filter.neighborhoods)
        .order_by("date_time", SortOrder::Desc)
        .order_by("case_number", SortOrder::Asc)
        .build()
}

/// Existence lookup for a case number
pub fn find_incident(case_number: &str) -> Statement {
    SelectBuilder::new("SELECT case_number FROM Incidents")
        .filter_eq("case_number", case_number)
        .build()
}

pub fn insert_incident(incident: &Incident) -> Statement {
    Statement::new(
        "INSERT INTO Incidents (case_number, date_time, code, incident, police_grid, \
         neighborhood_number, block) VALUES (?, ?, ?, ?, ?, ?, ?)",
        vec![
            SqlValue::from(incident.case_number.as_str()),
            SqlValue::from(incident.date_time.as_str()),
            SqlValue::Integer(incident.code),
            SqlValue::from(incident.incident.as_str()),
            SqlValue::Integer(incident.police_grid),
            SqlValue::Integer(incident.neighborhood_number),
            SqlValue::from(incident.block.as_str()),
        ],
    )
}

pub fn delete_incident(case_number: &str) -> Statement {
    Statement::new(
        "DELETE FROM Incidents WHERE case_number = ?",
        vec![SqlValue::from(case_number)],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filter::IncidentParams;

    #[test]
    fn test_list_codes_unfiltered() {
        let statement = list_codes(&IdSet::default());
        assert_eq!(
            statement.sql,
            "SELECT code, incident_type AS type FROM Codes ORDER BY code DESC"
        );
    }

    #[test]
    fn test_list_neighborhoods_filtered() {
        let ids: IdSet = [1, 2].into_iter().collect();
        let statement = list_neighborhoods(&ids);
        assert_eq!(
            statement.sql,
            "SELECT neighborhood_number AS id, neighborhood_name AS name FROM Neighborhoods \
             WHERE neighborhood_number IN (?, ?) ORDER BY neighborhood_number ASC"
        );
        assert_eq!(statement.params, vec![SqlValue::Integer(1), SqlValue::Integer(2)]);
    }

    #[test]
    fn test_list_incidents_all_filters() {
        let filter = IncidentFilter::from_params(&IncidentParams {
            start_date: Some("2019-10-01".to_string()),
            end_date: Some("2019-10-02".to_string()),
            code: Some("600".to_string()),
            grid: Some("87,88".to_string()),
            neighborhood: Some("7".to_string()),
        })
        .unwrap();

        let statement = list_incidents(&filter);
        assert!(statement.sql.ends_with(
            "WHERE date_time >= ? AND date_time < ? AND code IN (?) AND police_grid IN (?, ?) \
             AND neighborhood_number IN (?) ORDER BY date_time DESC, case_number ASC"
        ));
        assert_eq!(
            statement.params,
            vec![
                SqlValue::from("2019-10-01"),
                SqlValue::from("2019-10-03"),
                SqlValue::Integer(600),
                SqlValue::Integer(87),
                SqlValue::Integer(88),
                SqlValue::Integer(7),
            ]
        );
    }

    #[test]
    fn test_insert_binds_seven_fields_in_column_order() {
        let incident = Incident {
            case_number: "2023-001".to_string(),
            date_time: "2023-01-15T08:30:00".to_string(),
            code: 110,
            incident: "Murder".to_string(),
            police_grid: 87,
            neighborhood_number: 7,
            block: "1XX MAIN ST".to_string(),
        };

        let statement = insert_incident(&incident);
        assert_eq!(statement.sql.matches('?').count(), 7);
        assert_eq!(statement.params[0], SqlValue::from("2023-001"));
        assert_eq!(statement.params[4], SqlValue::Integer(87));
        assert_eq!(statement.params[6], SqlValue::from("1XX MAIN ST"));
    }

    #[test]
    fn test_find_and_delete_bind_case_number() {
        assert_eq!(
            find_incident("X").params,
            vec![SqlValue::Text("X".to_string())]
        );
        assert_eq!(
            delete_incident("X").sql,
            "DELETE FROM Incidents WHERE case_number = ?"
        );
    }
}
