// Copyright (c) 2022-2023 The Skycoin Project

//! Device requests raced against the HTTP request lifetime
//!
//! Operations run on a spawned task so a dropped request (client gone) or
//! an elapsed timeout can force-disconnect the device without waiting on it.
//! Only the handler writes the response, the task's result is discarded
//! once the request is gone.
//!
//! Each request runs on its own [DeviceHandle::scoped] handle so abandoning
//! a request never disconnects another client's operation.

use std::future::Future;

use log::{debug, warn};
use tokio::task::JoinHandle;

use skywallet::{Connect, DeviceHandle, Error, Reply};

use crate::{
    response::{reply, ApiError, ApiResult},
    AppState,
};

/// Disconnects the device if dropped while the operation is in flight
struct InFlight<C: Connect> {
    handle: DeviceHandle<C>,
    task: JoinHandle<Result<Reply, Error>>,
    complete: bool,
}

impl<C: Connect> InFlight<C> {
    /// Disconnect this request's operation, or abort the task if the
    /// operation has not reached the device
    fn disconnect(&self) {
        if !self.handle.disconnect() {
            self.task.abort();
        }
    }
}

impl<C: Connect> Drop for InFlight<C> {
    fn drop(&mut self) {
        if !self.complete && !self.task.is_finished() {
            debug!("Request dropped, disconnecting device");
            self.disconnect();
        }
    }
}

/// Run a device operation for an HTTP request, mapping the reply
pub async fn interactive<C, F, Fut>(state: &AppState<C>, f: F) -> ApiResult
where
    C: Connect,
    F: FnOnce(DeviceHandle<C>) -> Fut,
    Fut: Future<Output = Result<Reply, Error>> + Send + 'static,
{
    let handle = state.handle.scoped();
    let mut op = InFlight {
        task: tokio::spawn(f(handle.clone())),
        handle,
        complete: false,
    };

    let r = tokio::time::timeout(state.request_timeout, &mut op.task).await;
    op.complete = true;

    match r {
        Ok(Ok(r)) => reply(r?),
        Ok(Err(e)) => Err(ApiError::internal(e)),
        Err(_) => {
            warn!("Device request timed out, disconnecting");
            op.disconnect();
            Err(ApiError::client_closed())
        }
    }
}
