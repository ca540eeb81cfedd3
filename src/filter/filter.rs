use serde_json::Value;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterData, FilterOrderInfo, SqlResult};

/// Compiles a JSON filter description into parameterized SQL against one table.
pub struct Filter {
    table_name: String,
    select_columns: Vec<String>,
    where_data: Option<Value>,
    order_data: Vec<FilterOrderInfo>,
    limit: Option<i32>,
    offset: Option<i32>,
}

impl Filter {
    pub fn new(table_name: impl Into<String>) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        Self::validate_table_name(&table_name)?;
        Ok(Self {
            table_name,
            select_columns: vec![],
            where_data: None,
            order_data: vec![],
            limit: None,
            offset: None,
        })
    }

    pub fn assign(&mut self, data: FilterData) -> Result<&mut Self, FilterError> {
        if let Some(select) = data.select {
            self.select(select)?;
        }
        if let Some(where_clause) = data.where_clause {
            self.where_clause(where_clause)?;
        }
        if let Some(order) = data.order {
            self.order(order)?;
        }
        if let Some(limit) = data.limit {
            self.limit(limit, data.offset)?;
        }
        Ok(self)
    }

    pub fn select(&mut self, columns: Vec<String>) -> Result<&mut Self, FilterError> {
        Self::validate_select_columns(&columns)?;
        self.select_columns = columns;
        Ok(self)
    }

    pub fn where_clause(&mut self, conditions: Value) -> Result<&mut Self, FilterError> {
        FilterWhere::validate(&conditions)?;
        self.where_data = Some(conditions);
        Ok(self)
    }

    pub fn order(&mut self, order_spec: Value) -> Result<&mut Self, FilterError> {
        self.order_data = FilterOrder::validate_and_parse(&order_spec)?;
        Ok(self)
    }

    pub fn limit(&mut self, limit: i32, offset: Option<i32>) -> Result<&mut Self, FilterError> {
        if limit < 0 {
            return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string()));
        }
        if let Some(off) = offset {
            if off < 0 {
                return Err(FilterError::InvalidOffset("Offset must be non-negative".to_string()));
            }
        }
        self.limit = Some(limit);
        self.offset = offset;
        Ok(self)
    }

    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let select_clause = self.build_select_clause();
        let (where_clause, params) = self.build_where()?;
        let order_clause = FilterOrder::generate(&self.order_data)?;
        let limit_clause = self.build_limit_clause();

        let query = [
            format!("SELECT {}", select_clause),
            format!("FROM \"{}\"", self.table_name),
            if where_clause.is_empty() { String::new() } else { format!("WHERE {}", where_clause) },
            order_clause,
            limit_clause,
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        Ok(SqlResult { query, params })
    }

    pub fn to_count_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = self.build_where()?;
        let query = if where_clause.is_empty() {
            format!("SELECT COUNT(*) as count FROM \"{}\"", self.table_name)
        } else {
            format!(
                "SELECT COUNT(*) as count FROM \"{}\" WHERE {}",
                self.table_name, where_clause
            )
        };
        Ok(SqlResult { query, params })
    }

    fn build_where(&self) -> Result<(String, Vec<Value>), FilterError> {
        match &self.where_data {
            Some(where_data) => FilterWhere::generate(where_data, 0),
            None => Ok((String::new(), vec![])),
        }
    }

    fn validate_table_name(name: &str) -> Result<(), FilterError> {
        if name.is_empty() {
            return Err(FilterError::InvalidTableName("Table name cannot be empty".to_string()));
        }
        let mut chars = name.chars();
        let first = chars.next().unwrap();
        if !(first.is_alphabetic() || first == '_')
            || !name.chars().all(|c| c.is_alphanumeric() || c == '_')
        {
            return Err(FilterError::InvalidTableName(format!(
                "Invalid table name format: {}",
                name
            )));
        }
        Ok(())
    }

    fn validate_select_columns(columns: &[String]) -> Result<(), FilterError> {
        for column in columns {
            if column == "*" {
                continue;
            }
            if column.is_empty() {
                return Err(FilterError::InvalidColumn("Column name cannot be empty".to_string()));
            }
            let first = column.chars().next().unwrap();
            if !(first.is_alphabetic() || first == '_')
                || !column.chars().all(|c| c.is_alphanumeric() || c == '_')
            {
                return Err(FilterError::InvalidColumn(format!(
                    "Invalid column name format: {}",
                    column
                )));
            }
        }
        Ok(())
    }

    fn build_select_clause(&self) -> String {
        if self.select_columns.is_empty() || self.select_columns.contains(&"*".to_string()) {
            "*".to_string()
        } else {
            self.select_columns
                .iter()
                .map(|c| format!("\"{}\"", c))
                .collect::<Vec<_>>()
                .join(", ")
        }
    }

    fn build_limit_clause(&self) -> String {
        match (self.limit, self.offset) {
            (Some(l), Some(o)) => format!("LIMIT {} OFFSET {}", l, o),
            (Some(l), None) => format!("LIMIT {}", l),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_bad_table_names() {
        assert!(Filter::new("products").is_ok());
        assert!(Filter::new("product_clicks").is_ok());
        assert!(Filter::new("").is_err());
        assert!(Filter::new("1products").is_err());
        assert!(Filter::new("products; DROP TABLE").is_err());
    }

    #[test]
    fn plain_select_without_filter() {
        let filter = Filter::new("products").unwrap();
        let sql = filter.to_sql().unwrap();
        assert_eq!(sql.query, "SELECT * FROM \"products\"");
        assert!(sql.params.is_empty());
    }

    #[test]
    fn search_page_query_shape() {
        let mut filter = Filter::new("products").unwrap();
        filter
            .assign(FilterData {
                where_clause: Some(json!({
                    "$or": [
                        { "name": { "$ilike": "%phone%" } },
                        { "description": { "$ilike": "%phone%" } }
                    ]
                })),
                order: Some(json!("created_at desc")),
                limit: Some(12),
                offset: Some(24),
                ..Default::default()
            })
            .unwrap();

        let sql = filter.to_sql().unwrap();
        assert!(sql.query.contains("\"name\" ILIKE $1"));
        assert!(sql.query.contains("OR"));
        assert!(sql.query.contains("\"description\" ILIKE $2"));
        assert!(sql.query.contains("ORDER BY \"created_at\" DESC"));
        assert!(sql.query.ends_with("LIMIT 12 OFFSET 24"));
        assert_eq!(sql.params, vec![json!("%phone%"), json!("%phone%")]);
    }

    #[test]
    fn count_sql_reuses_where_params() {
        let mut filter = Filter::new("products").unwrap();
        filter
            .assign(FilterData {
                where_clause: Some(json!({ "name": { "$ilike": "%tv%" } })),
                limit: Some(12),
                offset: Some(0),
                ..Default::default()
            })
            .unwrap();

        let sql = filter.to_count_sql().unwrap();
        assert_eq!(
            sql.query,
            "SELECT COUNT(*) as count FROM \"products\" WHERE \"name\" ILIKE $1"
        );
        assert_eq!(sql.params.len(), 1);
    }

    #[test]
    fn negative_limit_rejected() {
        let mut filter = Filter::new("products").unwrap();
        assert!(filter.limit(-1, None).is_err());
        assert!(filter.limit(12, Some(-3)).is_err());
    }
}
