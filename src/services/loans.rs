//! Loan-specific operations

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::{client::Transport, error::AppResult, models::Loan};

use super::ResourceService;

impl<T: Transport> ResourceService<Loan, T> {
    /// Mark a loan as returned at `now`
    pub async fn return_loan(&self, id: &str, now: DateTime<Utc>) -> AppResult<Loan> {
        tracing::info!(loan_id = id, "Returning loan");
        self.patch(id, &json!({ "returnedAt": now.to_rfc3339() })).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockTransport;
    use crate::config::ResponseShape;
    use chrono::TimeZone;
    use reqwest::Method;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_return_loan_puts_returned_at() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap();
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.method == Method::PUT
                    && req.path == "loans/l1"
                    && req.body.as_ref().and_then(|b| b["returnedAt"].as_str()).map(|s| s.starts_with("2024-06-15T10:30:00"))
                        == Some(true)
            })
            .times(1)
            .returning(|_| {
                Ok(json!({ "success": true, "data": {
                    "_id": "l1", "memberId": "m1", "bookId": "b1",
                    "loanedAt": "2024-06-01", "dueAt": "2024-06-08",
                    "returnedAt": "2024-06-15T10:30:00.000Z"
                }}))
            });

        let service: ResourceService<Loan, MockTransport> =
            ResourceService::new(Arc::new(transport), ResponseShape::Strict);
        let loan = service.return_loan("l1", now).await.unwrap();
        assert_eq!(loan.returned_at, Some(now));
    }
}
