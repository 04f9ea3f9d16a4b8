// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking Kubernetes API responses.

use http::{Request, Response};
use http_body_util::BodyExt;
use kube::client::Body;
use kube::Client;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// A request received by [`MockService`]
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// A mock HTTP service that returns predefined responses based on request paths.
///
/// Clones share their state, so a handle kept by the test can inspect the
/// recorded requests or swap responses after the client was built.
/// Unregistered PUT requests echo their body back with status 200.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a response for GET requests matching the path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.respond("GET", path, status, body);
        self
    }

    /// Add a response for PUT requests matching the path
    pub fn on_put(self, path: &str, status: u16, body: &str) -> Self {
        self.respond("PUT", path, status, body);
        self
    }

    /// Register or replace a response
    pub fn respond(&self, method: &str, path: &str, status: u16, body: &str) {
        self.responses.lock().unwrap().insert(
            (method.to_string(), path.to_string()),
            (status, body.to_string()),
        );
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    /// Requests received so far with the given method
    pub fn requests(&self, method: &str) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method)
            .cloned()
            .collect()
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();

        if let Some(resp) = responses.get(&(method.to_string(), path.to_string())) {
            return Some(resp.clone());
        }

        // Longest registered prefix wins, so lists and single gets can coexist
        responses
            .iter()
            .filter(|((m, p), _)| m == method && path.starts_with(p.as_str()))
            .max_by_key(|((_, p), _)| p.len())
            .map(|(_, resp)| resp.clone())
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        let response = self.find_response(&method, &path);
        let requests = self.requests.clone();

        Box::pin(async move {
            let body = req.into_body().collect().await?.to_bytes().to_vec();
            requests.lock().unwrap().push(RecordedRequest {
                method: method.clone(),
                path: path.clone(),
                body: body.clone(),
            });

            let (status, body) = match response {
                Some(resp) => resp,
                None if method == "PUT" => (200, String::from_utf8_lossy(&body).into_owned()),
                None => (404, not_found_json("resource", &path)),
            };

            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}

/// Create a 500 internal error response
pub fn internal_error_json() -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": "etcdserver: request timed out",
        "reason": "InternalError",
        "code": 500
    })
    .to_string()
}

/// Create a secret JSON object with plain text data values
pub fn secret_value(namespace: &str, name: &str, data: &[(&str, &str)]) -> serde_json::Value {
    use k8s_openapi::ByteString;

    let data: BTreeMap<String, ByteString> = data
        .iter()
        .map(|(k, v)| (k.to_string(), ByteString(v.as_bytes().to_vec())))
        .collect();

    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Secret",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "uid": format!("{}-uid", name)
        },
        "type": "Opaque",
        "data": data
    })
}

pub fn secret_json(namespace: &str, name: &str, data: &[(&str, &str)]) -> String {
    secret_value(namespace, name, data).to_string()
}

/// Create a secret JSON object owned by the given (apiVersion, kind) owners
pub fn owned_secret_value(namespace: &str, name: &str, owners: &[(&str, &str)]) -> serde_json::Value {
    let mut secret = secret_value(namespace, name, &[("password", "hunter2")]);
    let owner_references: Vec<serde_json::Value> = owners
        .iter()
        .enumerate()
        .map(|(idx, (api_version, kind))| {
            serde_json::json!({
                "apiVersion": api_version,
                "kind": kind,
                "name": format!("{}-owner-{}", name, idx),
                "uid": format!("{}-owner-uid-{}", name, idx),
                "controller": idx == 0
            })
        })
        .collect();
    if !owner_references.is_empty() {
        secret["metadata"]["ownerReferences"] = serde_json::Value::Array(owner_references);
    }
    secret
}

/// Wrap items into a SecretList response
pub fn secret_list_json(items: Vec<serde_json::Value>) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "SecretList",
        "metadata": { "resourceVersion": "1" },
        "items": items
    })
    .to_string()
}

pub fn service_account_json(
    namespace: &str,
    name: &str,
    annotations: &BTreeMap<String, String>,
) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "ServiceAccount",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "annotations": annotations
        }
    })
    .to_string()
}

/// Create a deployment JSON response with a single container
pub fn deployment_json(
    namespace: &str,
    name: &str,
    container: serde_json::Value,
    pod_extras: serde_json::Value,
) -> String {
    let mut pod_spec = serde_json::json!({ "containers": [container] });
    if let (Some(spec), Some(extras)) = (pod_spec.as_object_mut(), pod_extras.as_object()) {
        for (k, v) in extras {
            spec.insert(k.clone(), v.clone());
        }
    }

    serde_json::json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": { "name": name, "namespace": namespace },
        "spec": {
            "selector": { "matchLabels": { "app": name } },
            "template": {
                "metadata": { "labels": { "app": name } },
                "spec": pod_spec
            }
        }
    })
    .to_string()
}

/// An environment variable with a literal value
pub fn env_value(name: &str, value: &str) -> serde_json::Value {
    serde_json::json!({ "name": name, "value": value })
}

/// An environment variable sourced from a secret key
pub fn env_secret_ref(name: &str, secret: &str, key: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "valueFrom": { "secretKeyRef": { "name": secret, "key": key } }
    })
}
