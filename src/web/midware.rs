use std::sync::Arc;

use axum::{
    http::{Method, Uri},
    response::Response,
};

use crate::web::{log, Error, REQUEST_ID_HEADER};

/// Turns a `web::Error` stored in the response extensions into the body the client gets to see,
/// and logs the request.
pub async fn response_mapper(req_method: Method, uri: Uri, resp: Response) -> Response {
    // Set by the `SetRequestIdLayer` on the request and copied over by the `PropagateRequestIdLayer`,
    // which runs before this mapper on the way out.
    let req_id = resp
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|val| val.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let web_error = resp.extensions().get::<Arc<Error>>().map(Arc::as_ref);
    let client_status_and_error = web_error.map(Error::status_code_and_client_error);

    if let Some(Error::Database(db_err)) = web_error {
        tracing::error!("SERVER ERROR: {db_err:?} ID: {req_id}");
    }

    let err_resp = client_status_and_error.as_ref().map(|(status, cl_err)| {
        let mut err_resp = cl_err.to_response(*status);
        if let Some(req_id) = resp.headers().get(REQUEST_ID_HEADER) {
            err_resp
                .headers_mut()
                .insert(REQUEST_ID_HEADER, req_id.clone());
        }
        err_resp
    });

    log::log_request(
        &req_id,
        req_method,
        uri,
        resp.status(),
        web_error,
        client_status_and_error.as_ref(),
    );

    err_resp.unwrap_or(resp)
}
