//! Request Router
//!
//! Turns one parsed request into one response. The router checks request
//! validity and authorization before touching any store, then dispatches
//! GET/PUT/DELETE against the namespace's store under the shared data lock.
//!
//! Decision order:
//! 1. Unrecognized method or namespace token → 400, no store access.
//! 2. Private namespace without valid authentication → 401, no store access.
//! 3. Otherwise dispatch:
//!    - GET: 200 with the value as body, or 404
//!    - PUT: 200 (absent body is stored as the empty string), or 500 when
//!      the store cannot grow
//!    - DELETE: 200, or 404
//!
//! The data lock is taken once per request, around the single store call
//! only. It is never held while bytes move on the network, and it is
//! released before the worker takes the statistics lock.

use crate::protocol::{Method, Namespace, Request, Response};
use crate::storage::SharedNamespaces;
use tracing::error;

/// Routes requests to the namespace stores. Cheap to clone; every worker
/// holds one, all sharing the same stores behind the data lock.
#[derive(Debug, Clone)]
pub struct Router {
    stores: SharedNamespaces,
}

impl Router {
    pub fn new(stores: SharedNamespaces) -> Self {
        Self { stores }
    }

    /// Produces the response for one request.
    pub fn route(&self, request: &Request) -> Response {
        let (method, namespace) = match (request.method, request.namespace) {
            (Some(method), Some(namespace)) => (method, namespace),
            _ => return Response::bad_request(),
        };

        if namespace == Namespace::Private && !request.authenticated {
            return Response::unauthorized();
        }

        let mut namespaces = self.stores.lock().unwrap();
        let store = namespaces.store_mut(namespace);

        match method {
            Method::Get => match store.get(&request.key) {
                Some(value) => Response::ok_with_body(value),
                None => Response::not_found(),
            },
            Method::Put => {
                // An absent body on PUT stores the empty string
                let value = request.body.as_deref().unwrap_or("");
                match store.put(&request.key, value) {
                    Ok(()) => Response::ok(),
                    Err(e) => {
                        error!(key = %request.key, error = %e, "store mutation failed");
                        Response::internal_server_error()
                    }
                }
            }
            Method::Delete => {
                if store.delete(&request.key) {
                    Response::ok()
                } else {
                    Response::not_found()
                }
            }
        }
    }
}
