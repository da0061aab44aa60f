//! Resource services
//!
//! Thin mappings from operations to REST calls. Each [`ResourceService`] is bound
//! to the transport of the back end that owns its resource; [`Services`] hands
//! them out.

pub mod health;
pub mod loans;

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use validator::Validate;

use crate::{
    client::{ApiRequest, HttpClient, Transport},
    config::{AppConfig, ResponseShape},
    error::AppResult,
    models::{Backend, Deleted, Page, Resource},
    normalize,
};

/// CRUD operations for one resource type
pub struct ResourceService<R, T> {
    transport: Arc<T>,
    shape: ResponseShape,
    _resource: PhantomData<fn() -> R>,
}

impl<R, T> Clone for ResourceService<R, T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            shape: self.shape,
            _resource: PhantomData,
        }
    }
}

impl<R: Resource, T: Transport> ResourceService<R, T> {
    pub fn new(transport: Arc<T>, shape: ResponseShape) -> Self {
        Self {
            transport,
            shape,
            _resource: PhantomData,
        }
    }

    fn collection_path() -> &'static str {
        R::KIND.path()
    }

    fn record_path(id: &str) -> String {
        format!("{}/{}", R::KIND.path(), id)
    }

    /// Fetch one page (1-based) of the collection
    pub async fn list(&self, page: u32, page_size: u32) -> AppResult<Page<R>> {
        let page = page.max(1);
        let request = ApiRequest::get(Self::collection_path())
            .with_query("page", page)
            .with_query("limit", page_size);
        let body = self.transport.send(request).await?;
        normalize::decode_page(body, self.shape, R::KIND.collection_field(), page)
    }

    /// Fetch one record; a missing record is [`AppError::NotFound`](crate::AppError::NotFound)
    pub async fn get(&self, id: &str) -> AppResult<R> {
        let body = self.transport.send(ApiRequest::get(Self::record_path(id))).await?;
        normalize::decode_record(body, self.shape)
    }

    pub async fn create(&self, input: &R::Input) -> AppResult<R> {
        input.validate()?;
        let body = serde_json::to_value(input)?;
        let response = self
            .transport
            .send(ApiRequest::post(Self::collection_path(), body))
            .await?;
        let created: R = normalize::decode_record(response, self.shape)?;
        tracing::info!(resource = %R::KIND, id = created.id(), "Created {}", R::KIND.label());
        Ok(created)
    }

    pub async fn update(&self, id: &str, input: &R::Input) -> AppResult<R> {
        input.validate()?;
        self.patch(id, input).await
    }

    /// Send a partial record; the back end merges it into the stored one
    pub async fn patch<P: Serialize + ?Sized>(&self, id: &str, partial: &P) -> AppResult<R> {
        let body = serde_json::to_value(partial)?;
        let response = self.transport.send(ApiRequest::put(Self::record_path(id), body)).await?;
        let updated: R = normalize::decode_record(response, self.shape)?;
        tracing::info!(resource = %R::KIND, id, "Updated {}", R::KIND.label());
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> AppResult<Deleted> {
        let body = self.transport.send(ApiRequest::delete(Self::record_path(id))).await?;
        if let Some(err) = normalize::unsuccessful(&body) {
            return Err(err);
        }
        tracing::info!(resource = %R::KIND, id, "Deleted {}", R::KIND.label());
        Ok(Deleted {
            kind: R::KIND,
            id: id.to_string(),
        })
    }
}

/// Container for the back-end transports
pub struct Services<T = HttpClient> {
    library: Arc<T>,
    hotel: Arc<T>,
    library_shape: ResponseShape,
    hotel_shape: ResponseShape,
}

impl<T> Clone for Services<T> {
    fn clone(&self) -> Self {
        Self {
            library: Arc::clone(&self.library),
            hotel: Arc::clone(&self.hotel),
            library_shape: self.library_shape,
            hotel_shape: self.hotel_shape,
        }
    }
}

impl Services<HttpClient> {
    /// Build HTTP transports for both back ends
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        Ok(Self::new(
            HttpClient::new(&config.library)?,
            config.library.response_shape,
            HttpClient::new(&config.hotel)?,
            config.hotel.response_shape,
        ))
    }
}

impl<T: Transport> Services<T> {
    pub fn new(library: T, library_shape: ResponseShape, hotel: T, hotel_shape: ResponseShape) -> Self {
        Self {
            library: Arc::new(library),
            hotel: Arc::new(hotel),
            library_shape,
            hotel_shape,
        }
    }

    fn backend(&self, backend: Backend) -> (Arc<T>, ResponseShape) {
        match backend {
            Backend::Library => (Arc::clone(&self.library), self.library_shape),
            Backend::Hotel => (Arc::clone(&self.hotel), self.hotel_shape),
        }
    }

    /// Service for any resource, bound to the back end that owns it
    pub fn resource<R: Resource>(&self) -> ResourceService<R, T> {
        let (transport, shape) = self.backend(R::KIND.backend());
        ResourceService::new(transport, shape)
    }

    pub fn transport(&self, backend: Backend) -> Arc<T> {
        self.backend(backend).0
    }

    /// Raw call, for endpoints outside the resource collections
    pub async fn send(&self, backend: Backend, request: ApiRequest) -> AppResult<Value> {
        self.transport(backend).send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockTransport;
    use crate::error::AppError;
    use crate::models::{Book, BookInput, Room};
    use reqwest::Method;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    fn book_json(id: &str) -> Value {
        json!({ "_id": id, "isbn": "9780140449136", "title": "The Odyssey", "author": "Homer", "copies": 2 })
    }

    fn books(transport: MockTransport) -> ResourceService<Book, MockTransport> {
        ResourceService::new(Arc::new(transport), ResponseShape::Strict)
    }

    #[tokio::test]
    async fn test_list_maps_page_and_limit() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.method == Method::GET
                    && req.path == "books"
                    && req.query_param("page") == Some("2")
                    && req.query_param("limit") == Some("10")
            })
            .times(1)
            .returning(|_| {
                Ok(json!({
                    "success": true,
                    "data": [book_json("b1")],
                    "pagination": { "pages": 4, "total": 31 }
                }))
            });

        let page = assert_ok!(books(transport).list(2, 10).await);
        assert_eq!(page.items[0].id, "b1");
        assert_eq!(page.pages, 4);
        assert_eq!(page.total, 31);
    }

    #[tokio::test]
    async fn test_get_not_found_surfaces() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| req.method == Method::GET && req.path == "books/missing")
            .times(1)
            .returning(|_| Err(AppError::NotFound("Book not found".to_string())));

        let err = books(transport).get("missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(err.user_message("Failed"), "Book not found");
    }

    #[tokio::test]
    async fn test_create_posts_camel_case_payload() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.method == Method::POST
                    && req.path == "books"
                    && req.body.as_ref().map(|b| b["isbn"] == "9780140449136" && b["copies"] == 2)
                        == Some(true)
            })
            .times(1)
            .returning(|_| Ok(json!({ "success": true, "data": book_json("new") })));

        let input = BookInput {
            isbn: "9780140449136".to_string(),
            title: "The Odyssey".to_string(),
            author: "Homer".to_string(),
            copies: 2,
        };
        let created = books(transport).create(&input).await.unwrap();
        assert_eq!(created.id, "new");
    }

    #[tokio::test]
    async fn test_invalid_input_never_leaves_the_client() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(0);

        let input = BookInput {
            isbn: "9780140449136".to_string(),
            title: "The Odyssey".to_string(),
            author: "Homer".to_string(),
            copies: -1,
        };
        let err = assert_err!(books(transport).update("b1", &input).await);
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(err.to_string().contains("copies"));
    }

    #[tokio::test]
    async fn test_delete_confirms_id() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| req.method == Method::DELETE && req.path == "books/b1")
            .times(1)
            .returning(|_| Ok(json!({ "success": true, "message": "Book deleted" })));

        let deleted = assert_ok!(books(transport).delete("b1").await);
        assert_eq!(deleted.id, "b1");
    }

    #[tokio::test]
    async fn test_delete_refused_in_envelope_is_an_error() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Ok(json!({ "success": false, "message": "Book has active loans" })));

        let err = assert_err!(books(transport).delete("b1").await);
        assert!(matches!(
            err,
            AppError::Api { status: 200, message: Some(ref m) } if m == "Book has active loans"
        ));
    }

    #[tokio::test]
    async fn test_delete_accepts_empty_body() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(1).returning(|_| Ok(Value::Null));

        assert_ok!(books(transport).delete("b1").await);
    }

    #[tokio::test]
    async fn test_api_errors_are_not_retried() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(1).returning(|_| {
            Err(AppError::Api {
                status: 503,
                message: None,
            })
        });

        let result = books(transport).list(1, 10).await;
        assert!(matches!(result, Err(AppError::Api { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_services_route_by_backend() {
        let library = MockTransport::new();
        let mut hotel = MockTransport::new();
        hotel
            .expect_send()
            .withf(|req| req.path == "rooms")
            .times(1)
            .returning(|_| {
                Ok(json!({ "rooms": [{
                    "_id": "r1", "number": "101", "type": "single",
                    "price": 80, "capacity": 1, "status": "available", "amenities": []
                }] }))
            });

        let services = Services::new(library, ResponseShape::Strict, hotel, ResponseShape::Lenient);
        let page = services.resource::<Room>().list(1, 10).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].number, "101");
    }
}
