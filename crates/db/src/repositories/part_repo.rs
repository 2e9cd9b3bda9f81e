//! Repository for the `parts` table, including category moves and CSV
//! import upserts.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::postgres::PgArguments;
use sqlx::query::{QueryAs, QueryScalar};
use sqlx::{PgConnection, PgPool, Postgres};
use stockroom_core::eav::filter::{Clause, Condition};
use stockroom_core::eav::TypedValue;
use stockroom_core::types::DbId;

use crate::models::attribute_value::ValueWrite;
use crate::models::part::{
    CreatePart, ImportSummary, Part, PartFilter, PartImportRow, PartSummary, UpdatePart,
};
use crate::repositories::{contains_pattern, ilike_pattern, AttributeValueRepo};

/// Column list for `parts` queries.
const COLUMNS: &str = "\
    id, part_number, name, category_id, manufacturer, unit, part_type, \
    manufacturer_type, primary_vendor_id, created_at, updated_at";

/// Select list producing [`PartSummary`]; sort expressions use the `p` and
/// `c` aliases.
const SUMMARY_SELECT: &str = "\
    SELECT p.id, p.part_number, p.name, p.category_id, c.name AS category_name, \
           p.manufacturer, p.unit, p.part_type, p.manufacturer_type, \
           p.primary_vendor_id, v.name AS primary_vendor_name, p.updated_at \
    FROM parts p \
    LEFT JOIN part_categories c ON c.id = p.category_id \
    LEFT JOIN vendors v ON v.id = p.primary_vendor_id";

/// Provides CRUD operations for parts.
pub struct PartRepo;

impl PartRepo {
    // -----------------------------------------------------------------------
    // CRUD
    // -----------------------------------------------------------------------

    pub async fn create(pool: &PgPool, input: &CreatePart) -> Result<Part, sqlx::Error> {
        let query = format!(
            "INSERT INTO parts \
                 (part_number, name, category_id, manufacturer, unit, \
                  part_type, manufacturer_type) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Part>(&query)
            .bind(&input.part_number)
            .bind(&input.name)
            .bind(input.category_id)
            .bind(input.manufacturer.as_deref())
            .bind(input.unit.as_deref())
            .bind(input.part_type.as_deref())
            .bind(input.manufacturer_type.as_deref())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Part>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM parts WHERE id = $1");
        sqlx::query_as::<_, Part>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_summary(pool: &PgPool, id: DbId) -> Result<Option<PartSummary>, sqlx::Error> {
        let query = format!("{SUMMARY_SELECT} WHERE p.id = $1");
        sqlx::query_as::<_, PartSummary>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Part summaries matching `filter` in `order_by` order. With a `limit`,
    /// only that window starting at `offset` is returned.
    ///
    /// `order_by` must come from a whitelisted sort spec; it is interpolated
    /// into the query.
    pub async fn search(
        pool: &PgPool,
        filter: &PartFilter,
        order_by: &str,
        limit: Option<i64>,
        offset: i64,
    ) -> Result<Vec<PartSummary>, sqlx::Error> {
        let (where_clause, bind_values) = build_part_filter(filter);
        let mut query = format!("{SUMMARY_SELECT} {where_clause} ORDER BY {order_by}");
        if limit.is_some() {
            let next = bind_values.len() + 1;
            query.push_str(&format!(" LIMIT ${next} OFFSET ${}", next + 1));
        }

        let mut q = bind_part_values(sqlx::query_as::<_, PartSummary>(&query), &bind_values);
        if let Some(limit) = limit {
            q = q.bind(limit).bind(offset);
        }
        q.fetch_all(pool).await
    }

    /// Count parts matching `filter` (for pagination metadata).
    pub async fn count(pool: &PgPool, filter: &PartFilter) -> Result<i64, sqlx::Error> {
        let (where_clause, bind_values) = build_part_filter(filter);
        let query = format!("SELECT COUNT(*)::BIGINT FROM parts p {where_clause}");
        let q = bind_part_values_scalar(sqlx::query_scalar::<_, i64>(&query), &bind_values);
        q.fetch_one(pool).await
    }

    /// Update plain fields. Returns `None` if the part does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePart,
    ) -> Result<Option<Part>, sqlx::Error> {
        let query = format!(
            "UPDATE parts SET \
                 part_number = COALESCE($2, part_number), \
                 name = COALESCE($3, name), \
                 manufacturer = COALESCE($4, manufacturer), \
                 unit = COALESCE($5, unit), \
                 part_type = COALESCE($6, part_type), \
                 manufacturer_type = COALESCE($7, manufacturer_type) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Part>(&query)
            .bind(id)
            .bind(input.part_number.as_deref())
            .bind(input.name.as_deref())
            .bind(input.manufacturer.as_deref())
            .bind(input.unit.as_deref())
            .bind(input.part_type.as_deref())
            .bind(input.manufacturer_type.as_deref())
            .fetch_optional(pool)
            .await
    }

    /// Delete a part. Its values and vendor offers cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM parts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Category changes
    // -----------------------------------------------------------------------

    /// Drop every value of the part, set its category and write the carried
    /// values. Returns `None` if the part does not exist.
    async fn move_to_category(
        conn: &mut PgConnection,
        part_id: DbId,
        category_id: Option<DbId>,
        carried: &[ValueWrite],
    ) -> Result<Option<Part>, sqlx::Error> {
        sqlx::query("DELETE FROM part_attribute_values WHERE part_id = $1")
            .bind(part_id)
            .execute(&mut *conn)
            .await?;

        let query = format!("UPDATE parts SET category_id = $2 WHERE id = $1 RETURNING {COLUMNS}");
        let Some(part) = sqlx::query_as::<_, Part>(&query)
            .bind(part_id)
            .bind(category_id)
            .fetch_optional(&mut *conn)
            .await?
        else {
            return Ok(None);
        };

        for write in carried {
            AttributeValueRepo::write(&mut *conn, part_id, write).await?;
        }
        Ok(Some(part))
    }

    /// Move one part to `category_id`, keeping only `carried` values.
    pub async fn change_category(
        pool: &PgPool,
        part_id: DbId,
        category_id: Option<DbId>,
        carried: &[ValueWrite],
    ) -> Result<Option<Part>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let part = Self::move_to_category(&mut *tx, part_id, category_id, carried).await?;
        tx.commit().await?;
        Ok(part)
    }

    /// Move several parts in one transaction. Each entry pairs a part id with
    /// the values it carries over. A missing part aborts the whole batch
    /// with `RowNotFound`.
    pub async fn bulk_change_category(
        pool: &PgPool,
        category_id: Option<DbId>,
        moves: &[(DbId, Vec<ValueWrite>)],
    ) -> Result<Vec<Part>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut parts = Vec::with_capacity(moves.len());
        for (part_id, carried) in moves {
            let part = Self::move_to_category(&mut *tx, *part_id, category_id, carried)
                .await?
                .ok_or(sqlx::Error::RowNotFound)?;
            parts.push(part);
        }
        tx.commit().await?;
        Ok(parts)
    }

    // -----------------------------------------------------------------------
    // CSV import
    // -----------------------------------------------------------------------

    /// Upsert parts by `(part_number, name)` and write their values, all in
    /// one transaction. Values of attributes outside a part's (new) category
    /// are removed.
    pub async fn import(
        pool: &PgPool,
        rows: &[PartImportRow],
    ) -> Result<ImportSummary, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut summary = ImportSummary::default();

        for row in rows {
            let (part_id, inserted) = sqlx::query_as::<_, (DbId, bool)>(
                "INSERT INTO parts \
                     (part_number, name, category_id, manufacturer, unit, \
                      part_type, manufacturer_type) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) \
                 ON CONFLICT (part_number, name) DO UPDATE SET \
                     category_id = EXCLUDED.category_id, \
                     manufacturer = EXCLUDED.manufacturer, \
                     unit = EXCLUDED.unit, \
                     part_type = EXCLUDED.part_type, \
                     manufacturer_type = EXCLUDED.manufacturer_type \
                 RETURNING id, (xmax = 0) AS inserted",
            )
            .bind(&row.part.part_number)
            .bind(&row.part.name)
            .bind(row.part.category_id)
            .bind(row.part.manufacturer.as_deref())
            .bind(row.part.unit.as_deref())
            .bind(row.part.part_type.as_deref())
            .bind(row.part.manufacturer_type.as_deref())
            .fetch_one(&mut *tx)
            .await?;

            if inserted {
                summary.created += 1;
            } else {
                summary.updated += 1;
                sqlx::query(
                    "DELETE FROM part_attribute_values \
                     WHERE part_id = $1 \
                       AND attribute_id NOT IN \
                           (SELECT id FROM part_attributes WHERE category_id = $2)",
                )
                .bind(part_id)
                .bind(row.part.category_id)
                .execute(&mut *tx)
                .await?;
            }

            for write in &row.values {
                AttributeValueRepo::write(&mut *tx, part_id, write).await?;
                if write.value.is_some() {
                    summary.values_written += 1;
                }
            }
        }

        tx.commit().await?;
        Ok(summary)
    }
}

// ---------------------------------------------------------------------------
// Search filter building
// ---------------------------------------------------------------------------

/// Typed bind value for dynamically-built part search queries.
enum BindValue {
    BigInt(i64),
    Text(String),
    Decimal(Decimal),
    Bool(bool),
    Date(NaiveDate),
}

/// Accumulates `AND`ed conditions and their numbered bind values.
#[derive(Default)]
struct FilterBuilder {
    conditions: Vec<String>,
    bind_values: Vec<BindValue>,
}

impl FilterBuilder {
    /// Register a bind value and return its `$n` placeholder.
    fn param(&mut self, value: BindValue) -> String {
        self.bind_values.push(value);
        format!("${}", self.bind_values.len())
    }

    /// Column of the value slot holding `value`, and the value as a bind.
    fn slot(&mut self, value: &TypedValue) -> (&'static str, String) {
        let (column, bind) = match value {
            TypedValue::Text(v) => ("pav.value_text", BindValue::Text(v.clone())),
            TypedValue::Integer(v) => ("pav.value_int", BindValue::BigInt(*v)),
            TypedValue::Decimal(v) => ("pav.value_dec", BindValue::Decimal(*v)),
            TypedValue::Boolean(v) => ("pav.value_bool", BindValue::Bool(*v)),
            TypedValue::Date(v) => ("pav.value_date", BindValue::Date(*v)),
            TypedValue::Choice(v) => ("ch.value", BindValue::Text(v.clone())),
        };
        (column, self.param(bind))
    }

    /// A clause becomes an `EXISTS` over the part's value row for the
    /// attribute, so each lookup can use the per-slot value indexes.
    fn clause(&mut self, clause: &Clause) {
        let category = self.param(BindValue::BigInt(clause.category_id));
        let attribute = self.param(BindValue::BigInt(clause.attribute_id));

        let predicate = match &clause.condition {
            Condition::Eq(v) => {
                let (column, p) = self.slot(v);
                format!("{column} = {p}")
            }
            Condition::Gt(v) => {
                let (column, p) = self.slot(v);
                format!("{column} > {p}")
            }
            Condition::Lt(v) => {
                let (column, p) = self.slot(v);
                format!("{column} < {p}")
            }
            Condition::Between(low, high) => {
                let (column, low) = self.slot(low);
                let (_, high) = self.slot(high);
                format!("{column} BETWEEN {low} AND {high}")
            }
            Condition::In(options) => {
                let alternatives: Vec<String> = options
                    .iter()
                    .map(|v| {
                        let (column, p) = self.slot(v);
                        format!("{column} = {p}")
                    })
                    .collect();
                format!("({})", alternatives.join(" OR "))
            }
            Condition::Contains(needle) => {
                let p = self.param(BindValue::Text(contains_pattern(needle)));
                format!("pav.value_text ILIKE {p}")
            }
        };

        self.conditions.push(format!(
            "(p.category_id = {category} AND EXISTS (\
                SELECT 1 FROM part_attribute_values pav \
                LEFT JOIN part_attribute_choices ch ON ch.id = pav.choice_id \
                WHERE pav.part_id = p.id AND pav.attribute_id = {attribute} AND {predicate}))"
        ));
    }
}

/// Build a WHERE clause and bind values from a part search.
///
/// The `where_clause` is empty if no filters are active, or starts with
/// `WHERE `. Conditions reference the `p` alias only.
fn build_part_filter(filter: &PartFilter) -> (String, Vec<BindValue>) {
    let mut builder = FilterBuilder::default();

    if filter.clauses.unsatisfiable {
        builder.conditions.push("FALSE".into());
    }

    if let Some(category_id) = filter.category_id {
        let p = builder.param(BindValue::BigInt(category_id));
        builder.conditions.push(format!("p.category_id = {p}"));
    }

    if let Some(pattern) = ilike_pattern(filter.search.as_deref()) {
        let p = builder.param(BindValue::Text(pattern));
        builder
            .conditions
            .push(format!("(p.part_number ILIKE {p} OR p.name ILIKE {p})"));
    }

    if let Some(pattern) = ilike_pattern(filter.manufacturer.as_deref()) {
        let p = builder.param(BindValue::Text(pattern));
        builder.conditions.push(format!("p.manufacturer ILIKE {p}"));
    }

    for clause in &filter.clauses.clauses {
        builder.clause(clause);
    }

    let where_clause = if builder.conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", builder.conditions.join(" AND "))
    };
    (where_clause, builder.bind_values)
}

/// Bind a slice of `BindValue` to a sqlx `QueryAs`.
fn bind_part_values<'q, O>(
    mut q: QueryAs<'q, Postgres, O, PgArguments>,
    bind_values: &'q [BindValue],
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for val in bind_values {
        match val {
            BindValue::BigInt(v) => q = q.bind(*v),
            BindValue::Text(v) => q = q.bind(v.as_str()),
            BindValue::Decimal(v) => q = q.bind(*v),
            BindValue::Bool(v) => q = q.bind(*v),
            BindValue::Date(v) => q = q.bind(*v),
        }
    }
    q
}

/// Bind a slice of `BindValue` to a sqlx `QueryScalar`.
fn bind_part_values_scalar<'q>(
    mut q: QueryScalar<'q, Postgres, i64, PgArguments>,
    bind_values: &'q [BindValue],
) -> QueryScalar<'q, Postgres, i64, PgArguments> {
    for val in bind_values {
        match val {
            BindValue::BigInt(v) => q = q.bind(*v),
            BindValue::Text(v) => q = q.bind(v.as_str()),
            BindValue::Decimal(v) => q = q.bind(*v),
            BindValue::Bool(v) => q = q.bind(*v),
            BindValue::Date(v) => q = q.bind(*v),
        }
    }
    q
}

#[cfg(test)]
mod tests {
    use stockroom_core::eav::filter::ClauseSet;

    use super::*;

    fn clause(condition: Condition) -> Clause {
        Clause {
            attribute_id: 12,
            category_id: 1,
            condition,
        }
    }

    #[test]
    fn no_filters_build_no_where_clause() {
        let (where_clause, binds) = build_part_filter(&PartFilter::default());
        assert!(where_clause.is_empty());
        assert!(binds.is_empty());
    }

    #[test]
    fn placeholders_follow_bind_order() {
        let filter = PartFilter {
            category_id: Some(1),
            search: Some("oil".into()),
            manufacturer: None,
            clauses: ClauseSet {
                clauses: vec![clause(Condition::Between(
                    TypedValue::Integer(5),
                    TypedValue::Integer(15),
                ))],
                unsatisfiable: false,
            },
        };
        let (where_clause, binds) = build_part_filter(&filter);
        assert!(where_clause.starts_with("WHERE p.category_id = $1 AND "));
        assert!(where_clause.contains("p.part_number ILIKE $2 OR p.name ILIKE $2"));
        assert!(where_clause.contains("pav.attribute_id = $4"));
        assert!(where_clause.contains("pav.value_int BETWEEN $5 AND $6"));
        assert_eq!(binds.len(), 6);
    }

    #[test]
    fn in_expands_to_alternatives_on_choice_value() {
        let filter = PartFilter {
            clauses: ClauseSet {
                clauses: vec![clause(Condition::In(vec![
                    TypedValue::Choice("Oil".into()),
                    TypedValue::Choice("Air".into()),
                ]))],
                unsatisfiable: false,
            },
            ..PartFilter::default()
        };
        let (where_clause, _) = build_part_filter(&filter);
        assert!(where_clause.contains("(ch.value = $3 OR ch.value = $4)"));
    }

    #[test]
    fn unsatisfiable_set_matches_nothing() {
        let filter = PartFilter {
            clauses: ClauseSet {
                clauses: Vec::new(),
                unsatisfiable: true,
            },
            ..PartFilter::default()
        };
        let (where_clause, _) = build_part_filter(&filter);
        assert_eq!(where_clause, "WHERE FALSE");
    }
}
