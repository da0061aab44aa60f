//! In-memory back end for view, shell and dashboard tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};

use crate::{
    client::{ApiRequest, Transport},
    error::{AppError, AppResult},
};

/// Stateful fake answering with the documented success envelope.
///
/// Collections are keyed by path (`books`, `rooms`, ...). Records keep their
/// insertion order, paging follows `page` / `limit`, and any path can be made to
/// fail with a given status until [`recover`](FakeBackend::recover) is called.
#[derive(Default)]
pub struct FakeBackend {
    collections: Mutex<HashMap<String, Vec<Value>>>,
    failures: Mutex<HashMap<String, (u16, Option<String>)>>,
    calls: Mutex<Vec<(Method, String)>>,
    next_id: Mutex<u64>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(self, name: &str, records: impl IntoIterator<Item = Value>) -> Self {
        self.collections
            .lock()
            .unwrap()
            .insert(name.to_string(), records.into_iter().collect());
        self
    }

    pub fn insert(&self, name: &str, record: Value) {
        self.collections
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_default()
            .push(record);
    }

    pub fn records(&self, name: &str) -> Vec<Value> {
        self.collections.lock().unwrap().get(name).cloned().unwrap_or_default()
    }

    /// Answer every request on `path` with `status`
    pub fn fail(&self, path: &str, status: u16, message: Option<&str>) {
        self.failures
            .lock()
            .unwrap()
            .insert(path.to_string(), (status, message.map(str::to_string)));
    }

    pub fn recover(&self, path: &str) {
        self.failures.lock().unwrap().remove(path);
    }

    /// Number of `method` requests sent to exactly `path`
    pub fn count(&self, method: &str, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, p)| m.as_str() == method && p == path)
            .count()
    }

    fn failure(&self, path: &str) -> Option<AppError> {
        let failures = self.failures.lock().unwrap();
        let (status, message) = failures.get(path)?.clone();
        Some(if status == 404 {
            AppError::NotFound(message.unwrap_or_default())
        } else {
            AppError::Api { status, message }
        })
    }

    fn list(&self, collection: &str, request: &ApiRequest) -> Value {
        let records = self.records(collection);
        let page: usize = request.query_param("page").and_then(|p| p.parse().ok()).unwrap_or(1);
        let limit: usize = request
            .query_param("limit")
            .and_then(|l| l.parse().ok())
            .unwrap_or(10)
            .max(1);
        let total = records.len();
        let pages = ((total + limit - 1) / limit).max(1);
        let data: Vec<Value> = records.into_iter().skip((page.max(1) - 1) * limit).take(limit).collect();
        json!({ "success": true, "data": data, "pagination": { "pages": pages, "total": total } })
    }

    fn not_found(collection: &str, id: &str) -> AppError {
        AppError::NotFound(format!("{} {} not found", collection, id))
    }
}

#[async_trait]
impl Transport for FakeBackend {
    async fn send(&self, request: ApiRequest) -> AppResult<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((request.method.clone(), request.path.clone()));
        if let Some(err) = self.failure(&request.path) {
            return Err(err);
        }

        if request.path == "health" {
            return Ok(json!({ "success": true, "message": "API is running" }));
        }

        let (collection, id) = match request.path.split_once('/') {
            Some((collection, id)) => (collection.to_string(), Some(id.to_string())),
            None => (request.path.clone(), None),
        };

        let mut collections = self.collections.lock().unwrap();
        match (request.method.as_str(), id) {
            ("GET", None) => {
                drop(collections);
                Ok(self.list(&collection, &request))
            }
            ("GET", Some(id)) => collections
                .get(&collection)
                .and_then(|records| records.iter().find(|r| r["_id"] == id.as_str()))
                .map(|record| json!({ "success": true, "data": record }))
                .ok_or_else(|| Self::not_found(&collection, &id)),
            ("POST", None) => {
                let mut record = request.body.clone().unwrap_or_else(|| json!({}));
                let mut next_id = self.next_id.lock().unwrap();
                *next_id += 1;
                record["_id"] = json!(format!("{}-{}", collection, *next_id));
                collections.entry(collection).or_default().push(record.clone());
                Ok(json!({ "success": true, "data": record }))
            }
            ("PUT", Some(id)) => {
                let record = collections
                    .get_mut(&collection)
                    .and_then(|records| records.iter_mut().find(|r| r["_id"] == id.as_str()))
                    .ok_or_else(|| Self::not_found(&collection, &id))?;
                if let (Some(target), Some(Value::Object(changes))) = (record.as_object_mut(), &request.body) {
                    for (key, value) in changes {
                        target.insert(key.clone(), value.clone());
                    }
                }
                Ok(json!({ "success": true, "data": record.clone() }))
            }
            ("DELETE", Some(id)) => {
                let records = collections.entry(collection.clone()).or_default();
                let before = records.len();
                records.retain(|r| r["_id"] != id.as_str());
                if records.len() == before {
                    return Err(Self::not_found(&collection, &id));
                }
                Ok(json!({ "success": true, "message": "Deleted" }))
            }
            (method, _) => Err(AppError::Api {
                status: 405,
                message: Some(format!("{} not supported on {}", method, request.path)),
            }),
        }
    }
}
