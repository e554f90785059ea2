//! Typed filters and aggregation stages.
//!
//! Covers exactly the operators the services issue. Each type renders to the
//! equivalent MongoDB document via `to_document`; the in-memory test store
//! interprets the same values directly.

use bson::{Bson, Document, doc};

/// Predicate over a single collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every document.
    All,
    /// `{field: value}`. Matches array fields containing the value.
    Eq(String, Bson),
    /// `{field: {$in: [...]}}`.
    In(String, Vec<Bson>),
    /// `{field: {$exists: bool}}`. A `null` value still exists.
    Exists(String, bool),
    /// Field exists and is neither `null` nor the empty string.
    NotEmpty(String),
    /// `{field: {$gt: value}}`. Only compares values of the same type family.
    Gt(String, Bson),
    /// `{field: {$gte: value}}`.
    Gte(String, Bson),
    /// Conjunction of filters.
    And(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::Eq(field.into(), value.into())
    }

    pub fn is_in(field: impl Into<String>, values: Vec<Bson>) -> Self {
        Self::In(field.into(), values)
    }

    pub fn exists(field: impl Into<String>) -> Self {
        Self::Exists(field.into(), true)
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Self::Exists(field.into(), false)
    }

    pub fn not_empty(field: impl Into<String>) -> Self {
        Self::NotEmpty(field.into())
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::Gt(field.into(), value.into())
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::Gte(field.into(), value.into())
    }

    /// Conjoin with another filter, flattening nested conjunctions.
    pub fn and(self, other: Filter) -> Self {
        match (self, other) {
            (Self::All, f) | (f, Self::All) => f,
            (Self::And(mut left), Self::And(right)) => {
                left.extend(right);
                Self::And(left)
            }
            (Self::And(mut left), f) => {
                left.push(f);
                Self::And(left)
            }
            (f, Self::And(mut right)) => {
                right.insert(0, f);
                Self::And(right)
            }
            (a, b) => Self::And(vec![a, b]),
        }
    }

    pub fn to_document(&self) -> Document {
        match self {
            Self::All => Document::new(),
            Self::Eq(field, value) => doc! { field: value.clone() },
            Self::In(field, values) => doc! { field: { "$in": values.clone() } },
            Self::Exists(field, exists) => doc! { field: { "$exists": *exists } },
            Self::NotEmpty(field) => {
                doc! { field: { "$exists": true, "$nin": [Bson::Null, ""] } }
            }
            Self::Gt(field, value) => doc! { field: { "$gt": value.clone() } },
            Self::Gte(field, value) => doc! { field: { "$gte": value.clone() } },
            Self::And(filters) => match filters.as_slice() {
                [] => Document::new(),
                [only] => only.to_document(),
                many => {
                    let parts: Vec<Document> = many.iter().map(Filter::to_document).collect();
                    doc! { "$and": parts }
                }
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn as_i32(self) -> i32 {
        match self {
            Self::Asc => 1,
            Self::Desc => -1,
        }
    }
}

/// Ordered sort specification: earlier keys take precedence.
pub type SortSpec = Vec<(String, SortOrder)>;

pub fn sort_document(spec: &[(String, SortOrder)]) -> Document {
    let mut d = Document::new();
    for (field, order) in spec {
        d.insert(field.clone(), order.as_i32());
    }
    d
}

/// Field selection for `find`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Projection {
    #[default]
    All,
    /// Keep `_id` plus the listed (possibly dotted) paths.
    Include(Vec<String>),
    /// Drop the listed paths.
    Exclude(Vec<String>),
}

impl Projection {
    pub fn include<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Include(fields.into_iter().map(Into::into).collect())
    }

    pub fn exclude<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Exclude(fields.into_iter().map(Into::into).collect())
    }

    pub fn to_document(&self) -> Option<Document> {
        let (fields, flag) = match self {
            Self::All => return None,
            Self::Include(fields) => (fields, 1),
            Self::Exclude(fields) => (fields, 0),
        };
        let mut d = Document::new();
        for field in fields {
            d.insert(field.clone(), flag);
        }
        Some(d)
    }
}

/// Arguments of a `find` call.
#[derive(Debug, Clone, PartialEq)]
pub struct FindQuery {
    pub filter: Filter,
    pub projection: Projection,
    pub sort: SortSpec,
    pub limit: Option<i64>,
}

impl FindQuery {
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            projection: Projection::All,
            sort: Vec::new(),
            limit: None,
        }
    }

    pub fn projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort.push((field.into(), order));
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Grouping key of a `$group` stage.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupKey {
    /// Single group over all input (`_id: null`).
    Null,
    /// Group by a field value; missing and `null` share one group.
    Field(String),
    /// Group by calendar year and month of a date field: `_id: {year, month}`.
    YearMonth(String),
}

impl GroupKey {
    pub fn field(path: impl Into<String>) -> Self {
        Self::Field(path.into())
    }

    fn to_bson(&self) -> Bson {
        match self {
            Self::Null => Bson::Null,
            Self::Field(path) => Bson::String(format!("${path}")),
            Self::YearMonth(path) => Bson::Document(doc! {
                "year": { "$year": format!("${path}") },
                "month": { "$month": format!("${path}") },
            }),
        }
    }
}

/// Reduction computed per group. Numeric reductions skip missing and
/// non-numeric inputs; with no numeric input they yield `null`.
#[derive(Debug, Clone, PartialEq)]
pub enum Accumulator {
    /// Number of documents in the group.
    Count,
    /// Number of documents whose field equals the value.
    CountIfEq(String, Bson),
    Avg(String),
    Min(String),
    Max(String),
}

impl Accumulator {
    fn to_document(&self) -> Document {
        match self {
            Self::Count => doc! { "$sum": 1 },
            Self::CountIfEq(path, value) => doc! {
                "$sum": { "$cond": [ { "$eq": [ format!("${path}"), value.clone() ] }, 1, 0 ] }
            },
            Self::Avg(path) => doc! { "$avg": format!("${path}") },
            Self::Min(path) => doc! { "$min": format!("${path}") },
            Self::Max(path) => doc! { "$max": format!("${path}") },
        }
    }
}

/// One stage of an aggregation pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Match(Filter),
    /// Left outer join against another collection, stored as an array field.
    Lookup {
        from: String,
        local_field: String,
        foreign_field: String,
        as_field: String,
    },
    /// One output document per array element; empty or missing arrays are dropped.
    Unwind(String),
    Group {
        key: GroupKey,
        accumulators: Vec<(String, Accumulator)>,
    },
    Sort(SortSpec),
    Limit(i64),
}

impl Stage {
    pub fn to_document(&self) -> Document {
        match self {
            Self::Match(filter) => doc! { "$match": filter.to_document() },
            Self::Lookup {
                from,
                local_field,
                foreign_field,
                as_field,
            } => doc! {
                "$lookup": {
                    "from": from,
                    "localField": local_field,
                    "foreignField": foreign_field,
                    "as": as_field,
                }
            },
            Self::Unwind(field) => doc! { "$unwind": format!("${field}") },
            Self::Group { key, accumulators } => {
                let mut group = doc! { "_id": key.to_bson() };
                for (name, acc) in accumulators {
                    group.insert(name.clone(), acc.to_document());
                }
                doc! { "$group": group }
            }
            Self::Sort(spec) => doc! { "$sort": sort_document(spec) },
            Self::Limit(n) => doc! { "$limit": *n },
        }
    }
}

/// Ordered list of stages, built fluently.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn matching(mut self, filter: Filter) -> Self {
        self.stages.push(Stage::Match(filter));
        self
    }

    pub fn lookup(
        mut self,
        from: impl Into<String>,
        local_field: impl Into<String>,
        foreign_field: impl Into<String>,
        as_field: impl Into<String>,
    ) -> Self {
        self.stages.push(Stage::Lookup {
            from: from.into(),
            local_field: local_field.into(),
            foreign_field: foreign_field.into(),
            as_field: as_field.into(),
        });
        self
    }

    pub fn unwind(mut self, field: impl Into<String>) -> Self {
        self.stages.push(Stage::Unwind(field.into()));
        self
    }

    pub fn group<I, S>(mut self, key: GroupKey, accumulators: I) -> Self
    where
        I: IntoIterator<Item = (S, Accumulator)>,
        S: Into<String>,
    {
        self.stages.push(Stage::Group {
            key,
            accumulators: accumulators
                .into_iter()
                .map(|(name, acc)| (name.into(), acc))
                .collect(),
        });
        self
    }

    pub fn sort<I, S>(mut self, spec: I) -> Self
    where
        I: IntoIterator<Item = (S, SortOrder)>,
        S: Into<String>,
    {
        self.stages.push(Stage::Sort(
            spec.into_iter().map(|(f, o)| (f.into(), o)).collect(),
        ));
        self
    }

    pub fn limit(mut self, n: i64) -> Self {
        self.stages.push(Stage::Limit(n));
        self
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn to_documents(&self) -> Vec<Document> {
        self.stages.iter().map(Stage::to_document).collect()
    }
}
