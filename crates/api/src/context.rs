use std::time::Duration;

use uuid::Uuid;

use pantry_infra::OpContext;

/// Per-request context inserted by the request middleware.
///
/// Carries the request id echoed in `x-request-id` and the deadline every
/// core operation of the request runs under.
#[derive(Debug, Copy, Clone)]
pub struct RequestContext {
    request_id: Uuid,
    op: OpContext,
}

impl RequestContext {
    pub fn new(timeout: Duration) -> Self {
        Self {
            request_id: Uuid::now_v7(),
            op: OpContext::with_timeout(timeout),
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn op(&self) -> &OpContext {
        &self.op
    }
}
