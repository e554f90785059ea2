//! In-memory [`DocumentStore`] for tests.
//!
//! Interprets the typed query model with MongoDB semantics for the subset the
//! services use: dotted paths fan out over arrays, `null` equality matches
//! missing fields, range filters only compare within a type family, group
//! output keeps first-seen order, and sorting follows the BSON type ranking.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, MutexGuard};

use bson::oid::ObjectId;
use bson::{Bson, Document, doc};

use pelfish_core::bson_ext::{as_f64, get_path};
use pelfish_core::store::query::SortSpec;
use pelfish_core::store::{
    Accumulator, DocumentStore, Filter, FindQuery, GroupKey, Pipeline, Projection, SortOrder,
    Stage, StoreError, UpdateOutcome,
};

/// Shared in-memory collections. Clones observe the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    collections: Mutex<HashMap<String, Vec<Document>>>,
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append documents to a collection, builder style.
    pub fn with(self, collection: &str, documents: impl IntoIterator<Item = Document>) -> Self {
        self.seed(collection, documents);
        self
    }

    pub fn seed(&self, collection: &str, documents: impl IntoIterator<Item = Document>) {
        self.lock()
            .entry(collection.to_owned())
            .or_default()
            .extend(documents);
    }

    /// Snapshot of a collection in insertion order.
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.lock().get(collection).cloned().unwrap_or_default()
    }

    /// Number of store operations issued so far, including failed ones.
    pub fn calls(&self) -> usize {
        self.inner.calls.load(AtomicOrdering::SeqCst)
    }

    /// Make every subsequent operation fail with [`StoreError::Unavailable`].
    pub fn fail_all(&self) {
        self.inner.failing.store(true, AtomicOrdering::SeqCst);
    }

    pub fn recover(&self) {
        self.inner.failing.store(false, AtomicOrdering::SeqCst);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Document>>> {
        self.inner
            .collections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn begin(&self) -> Result<(), StoreError> {
        self.inner.calls.fetch_add(1, AtomicOrdering::SeqCst);
        if self.inner.failing.load(AtomicOrdering::SeqCst) {
            return Err(StoreError::Unavailable("injected failure".to_owned()));
        }
        Ok(())
    }

    fn count_now(&self, collection: &str, filter: &Filter) -> u64 {
        self.lock()
            .get(collection)
            .map_or(0, |docs| docs.iter().filter(|d| matches(d, filter)).count() as u64)
    }

    fn find_now(&self, collection: &str, query: &FindQuery) -> Vec<Document> {
        let mut docs: Vec<Document> = self
            .lock()
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| matches(d, &query.filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        sort_documents(&mut docs, &query.sort);
        if let Some(limit) = query.limit {
            apply_limit(&mut docs, limit);
        }
        docs.into_iter()
            .map(|d| project(d, &query.projection))
            .collect()
    }

    fn aggregate_now(&self, collection: &str, pipeline: &Pipeline) -> Vec<Document> {
        let collections = self.lock();
        let mut docs = collections.get(collection).cloned().unwrap_or_default();
        for stage in pipeline.stages() {
            docs = match stage {
                Stage::Match(filter) => docs.into_iter().filter(|d| matches(d, filter)).collect(),
                Stage::Lookup {
                    from,
                    local_field,
                    foreign_field,
                    as_field,
                } => {
                    let foreign = collections.get(from).map(Vec::as_slice).unwrap_or(&[]);
                    docs.into_iter()
                        .map(|d| lookup(d, foreign, local_field, foreign_field, as_field))
                        .collect()
                }
                Stage::Unwind(path) => docs.into_iter().flat_map(|d| unwind(d, path)).collect(),
                Stage::Group { key, accumulators } => group(&docs, key, accumulators),
                Stage::Sort(spec) => {
                    sort_documents(&mut docs, spec);
                    docs
                }
                Stage::Limit(n) => {
                    apply_limit(&mut docs, *n);
                    docs
                }
            };
        }
        docs
    }

    fn update_now(
        &self,
        collection: &str,
        filter: &Filter,
        fields: &Document,
        many: bool,
    ) -> UpdateOutcome {
        let mut collections = self.lock();
        let mut outcome = UpdateOutcome::default();
        let Some(docs) = collections.get_mut(collection) else {
            return outcome;
        };
        for d in docs.iter_mut().filter(|d| matches(d, filter)) {
            outcome.matched += 1;
            let before = d.clone();
            for (path, value) in fields {
                set_path(d, path, value.clone());
            }
            if *d != before {
                outcome.modified += 1;
            }
            if !many {
                break;
            }
        }
        outcome
    }

    fn insert_now(&self, collection: &str, documents: Vec<Document>) -> Vec<Bson> {
        let mut collections = self.lock();
        let target = collections.entry(collection.to_owned()).or_default();
        let mut ids = Vec::with_capacity(documents.len());
        for mut d in documents {
            let id = match d.get("_id") {
                Some(id) => id.clone(),
                None => {
                    let id = Bson::ObjectId(ObjectId::new());
                    d.insert("_id", id.clone());
                    id
                }
            };
            ids.push(id);
            target.push(d);
        }
        ids
    }

    fn delete_now(&self, collection: &str, filter: &Filter) -> u64 {
        let mut collections = self.lock();
        let Some(docs) = collections.get_mut(collection) else {
            return 0;
        };
        match docs.iter().position(|d| matches(d, filter)) {
            Some(index) => {
                docs.remove(index);
                1
            }
            None => 0,
        }
    }
}

impl DocumentStore for MemoryStore {
    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        self.begin()?;
        Ok(self.count_now(collection, filter))
    }

    async fn find(&self, collection: &str, query: &FindQuery) -> Result<Vec<Document>, StoreError> {
        self.begin()?;
        Ok(self.find_now(collection, query))
    }

    async fn aggregate(
        &self,
        collection: &str,
        pipeline: &Pipeline,
    ) -> Result<Vec<Document>, StoreError> {
        self.begin()?;
        Ok(self.aggregate_now(collection, pipeline))
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        fields: Document,
    ) -> Result<UpdateOutcome, StoreError> {
        self.begin()?;
        Ok(self.update_now(collection, filter, &fields, false))
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: &Filter,
        fields: Document,
    ) -> Result<UpdateOutcome, StoreError> {
        self.begin()?;
        Ok(self.update_now(collection, filter, &fields, true))
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<Vec<Bson>, StoreError> {
        self.begin()?;
        Ok(self.insert_now(collection, documents))
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        self.begin()?;
        Ok(self.delete_now(collection, filter))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.begin()
    }
}

// ── Paths ────────────────────────────────────────────────────────────────────

/// Every value reachable at `path`, fanning out over arrays of documents.
fn values_at<'a>(doc: &'a Document, path: &str) -> Vec<&'a Bson> {
    let segments: Vec<&str> = path.split('.').collect();
    let mut out = Vec::new();
    collect_in_document(doc, &segments, &mut out);
    out
}

fn collect_in_document<'a>(doc: &'a Document, segments: &[&str], out: &mut Vec<&'a Bson>) {
    if let Some((head, rest)) = segments.split_first() {
        if let Some(value) = doc.get(*head) {
            collect(value, rest, out);
        }
    }
}

fn collect<'a>(value: &'a Bson, segments: &[&str], out: &mut Vec<&'a Bson>) {
    if segments.is_empty() {
        out.push(value);
        return;
    }
    match value {
        Bson::Document(inner) => collect_in_document(inner, segments, out),
        Bson::Array(items) => {
            for item in items {
                if let Bson::Document(inner) = item {
                    collect_in_document(inner, segments, out);
                }
            }
        }
        _ => {}
    }
}

/// Values at `path` with terminal arrays expanded to their elements.
fn flattened<'a>(doc: &'a Document, path: &str) -> Vec<&'a Bson> {
    values_at(doc, path)
        .into_iter()
        .flat_map(|v| match v {
            Bson::Array(items) => items.iter().collect(),
            other => vec![other],
        })
        .collect()
}

fn set_path(doc: &mut Document, path: &str, value: Bson) {
    match path.split_once('.') {
        None => {
            doc.insert(path, value);
        }
        Some((head, rest)) => {
            if !matches!(doc.get(head), Some(Bson::Document(_))) {
                doc.insert(head, Document::new());
            }
            if let Some(Bson::Document(inner)) = doc.get_mut(head) {
                set_path(inner, rest, value);
            }
        }
    }
}

fn remove_path(doc: &mut Document, path: &str) {
    match path.split_once('.') {
        None => {
            doc.remove(path);
        }
        Some((head, rest)) => {
            if let Some(Bson::Document(inner)) = doc.get_mut(head) {
                remove_path(inner, rest);
            }
        }
    }
}

// ── Filters ──────────────────────────────────────────────────────────────────

fn matches(doc: &Document, filter: &Filter) -> bool {
    match filter {
        Filter::All => true,
        Filter::Eq(path, expected) => equals_at(doc, path, expected),
        Filter::In(path, candidates) => candidates.iter().any(|c| equals_at(doc, path, c)),
        Filter::Exists(path, wanted) => values_at(doc, path).is_empty() != *wanted,
        Filter::NotEmpty(path) => {
            !values_at(doc, path).is_empty()
                && !equals_at(doc, path, &Bson::Null)
                && !equals_at(doc, path, &Bson::String(String::new()))
        }
        Filter::Gt(path, bound) => flattened(doc, path)
            .into_iter()
            .any(|v| same_family_cmp(v, bound) == Some(Ordering::Greater)),
        Filter::Gte(path, bound) => flattened(doc, path).into_iter().any(|v| {
            matches!(
                same_family_cmp(v, bound),
                Some(Ordering::Greater | Ordering::Equal)
            )
        }),
        Filter::And(filters) => filters.iter().all(|f| matches(doc, f)),
    }
}

fn equals_at(doc: &Document, path: &str, expected: &Bson) -> bool {
    let values = values_at(doc, path);
    if matches!(expected, Bson::Null) && values.is_empty() {
        return true;
    }
    values.into_iter().any(|v| {
        bson_eq(v, expected)
            || matches!(v, Bson::Array(items) if items.iter().any(|i| bson_eq(i, expected)))
    })
}

fn bson_eq(a: &Bson, b: &Bson) -> bool {
    match (as_f64(a), as_f64(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Comparison within one type family; `None` across families.
fn same_family_cmp(a: &Bson, b: &Bson) -> Option<Ordering> {
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => Some(x.cmp(y)),
        (Bson::DateTime(x), Bson::DateTime(y)) => Some(x.cmp(y)),
        (Bson::Boolean(x), Bson::Boolean(y)) => Some(x.cmp(y)),
        _ => match (as_f64(a), as_f64(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => None,
        },
    }
}

// ── Sorting ──────────────────────────────────────────────────────────────────

fn type_rank(value: Option<&Bson>) -> u8 {
    match value {
        None | Some(Bson::Null | Bson::Undefined) => 1,
        Some(Bson::MinKey) => 0,
        Some(Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_)) => 2,
        Some(Bson::String(_) | Bson::Symbol(_)) => 3,
        Some(Bson::Document(_)) => 4,
        Some(Bson::Array(_)) => 5,
        Some(Bson::Binary(_)) => 6,
        Some(Bson::ObjectId(_)) => 7,
        Some(Bson::Boolean(_)) => 8,
        Some(Bson::DateTime(_)) => 9,
        Some(Bson::Timestamp(_)) => 10,
        Some(Bson::RegularExpression(_)) => 11,
        Some(Bson::MaxKey) => 13,
        Some(_) => 12,
    }
}

fn total_cmp(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    let by_rank = type_rank(a).cmp(&type_rank(b));
    if by_rank != Ordering::Equal {
        return by_rank;
    }
    match (a, b) {
        (Some(Bson::ObjectId(x)), Some(Bson::ObjectId(y))) => x.bytes().cmp(&y.bytes()),
        (Some(Bson::Document(x)), Some(Bson::Document(y))) => {
            for ((kx, vx), (ky, vy)) in x.iter().zip(y.iter()) {
                let ordering = kx.cmp(ky).then_with(|| total_cmp(Some(vx), Some(vy)));
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            x.len().cmp(&y.len())
        }
        (Some(x), Some(y)) => match (as_f64(x), as_f64(y)) {
            (Some(fx), Some(fy)) => fx.total_cmp(&fy),
            _ => same_family_cmp(x, y).unwrap_or(Ordering::Equal),
        },
        _ => Ordering::Equal,
    }
}

/// Stable multi-key sort; ties keep their current relative order.
fn sort_documents(docs: &mut [Document], spec: &SortSpec) {
    if spec.is_empty() {
        return;
    }
    docs.sort_by(|a, b| {
        spec.iter().fold(Ordering::Equal, |acc, (path, order)| {
            acc.then_with(|| {
                let ordering = total_cmp(get_path(a, path), get_path(b, path));
                match order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            })
        })
    });
}

fn apply_limit(docs: &mut Vec<Document>, limit: i64) {
    if limit > 0 {
        docs.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    }
}

fn project(doc: Document, projection: &Projection) -> Document {
    match projection {
        Projection::All => doc,
        Projection::Include(paths) => {
            let mut out = Document::new();
            if let Some(id) = doc.get("_id") {
                out.insert("_id", id.clone());
            }
            for path in paths {
                if let Some(value) = get_path(&doc, path) {
                    set_path(&mut out, path, value.clone());
                }
            }
            out
        }
        Projection::Exclude(paths) => {
            let mut out = doc;
            for path in paths {
                remove_path(&mut out, path);
            }
            out
        }
    }
}

// ── Aggregation stages ───────────────────────────────────────────────────────

fn lookup(
    mut doc: Document,
    foreign: &[Document],
    local_field: &str,
    foreign_field: &str,
    as_field: &str,
) -> Document {
    let mut locals: Vec<Bson> = flattened(&doc, local_field).into_iter().cloned().collect();
    if locals.is_empty() {
        locals.push(Bson::Null);
    }
    let joined: Vec<Bson> = foreign
        .iter()
        .filter(|f| locals.iter().any(|l| equals_at(f, foreign_field, l)))
        .cloned()
        .map(Bson::Document)
        .collect();
    set_path(&mut doc, as_field, Bson::Array(joined));
    doc
}

fn unwind(doc: Document, path: &str) -> Vec<Document> {
    match get_path(&doc, path) {
        None | Some(Bson::Null) => Vec::new(),
        Some(Bson::Array(items)) => items
            .iter()
            .map(|item| {
                let mut out = doc.clone();
                set_path(&mut out, path, item.clone());
                out
            })
            .collect(),
        Some(_) => vec![doc],
    }
}

fn group_key(doc: &Document, key: &GroupKey) -> Bson {
    match key {
        GroupKey::Null => Bson::Null,
        GroupKey::Field(path) => get_path(doc, path).cloned().unwrap_or(Bson::Null),
        GroupKey::YearMonth(path) => match get_path(doc, path) {
            Some(Bson::DateTime(at)) => {
                let at = at.to_chrono();
                Bson::Document(doc! {
                    "year": chrono::Datelike::year(&at),
                    "month": chrono::Datelike::month(&at) as i32,
                })
            }
            _ => Bson::Null,
        },
    }
}

fn count_bson(n: usize) -> Bson {
    i32::try_from(n).map_or(Bson::Int64(n as i64), Bson::Int32)
}

fn accumulate(members: &[&Document], accumulator: &Accumulator) -> Bson {
    let numbers = |path: &str| -> Vec<(f64, Bson)> {
        members
            .iter()
            .filter_map(|d| get_path(d, path))
            .filter_map(|v| as_f64(v).map(|f| (f, v.clone())))
            .collect()
    };
    match accumulator {
        Accumulator::Count => count_bson(members.len()),
        Accumulator::CountIfEq(path, expected) => count_bson(
            members
                .iter()
                .filter(|d| get_path(d, path).is_some_and(|v| bson_eq(v, expected)))
                .count(),
        ),
        Accumulator::Avg(path) => {
            let values = numbers(path);
            if values.is_empty() {
                Bson::Null
            } else {
                let sum: f64 = values.iter().map(|(f, _)| f).sum();
                Bson::Double(sum / values.len() as f64)
            }
        }
        Accumulator::Min(path) => numbers(path)
            .into_iter()
            .min_by(|(a, _), (b, _)| a.total_cmp(b))
            .map_or(Bson::Null, |(_, v)| v),
        Accumulator::Max(path) => numbers(path)
            .into_iter()
            .max_by(|(a, _), (b, _)| a.total_cmp(b))
            .map_or(Bson::Null, |(_, v)| v),
    }
}

fn group(docs: &[Document], key: &GroupKey, accumulators: &[(String, Accumulator)]) -> Vec<Document> {
    let mut groups: Vec<(Bson, Vec<&Document>)> = Vec::new();
    for d in docs {
        let k = group_key(d, key);
        match groups.iter_mut().find(|(existing, _)| bson_eq(existing, &k)) {
            Some((_, members)) => members.push(d),
            None => groups.push((k, vec![d])),
        }
    }
    groups
        .into_iter()
        .map(|(k, members)| {
            let mut out = doc! { "_id": k };
            for (name, accumulator) in accumulators {
                out.insert(name.clone(), accumulate(&members, accumulator));
            }
            out
        })
        .collect()
}
