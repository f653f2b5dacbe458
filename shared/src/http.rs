//! HTTP helpers for Lambda functions.

use lambda_http::{Body, Response};

/// Create a plain text response with the given status code.
pub fn text_response(
    status: u16,
    body: impl Into<String>,
) -> Result<Response<Body>, lambda_http::Error> {
    let response = Response::builder()
        .status(status)
        .header("content-type", "text/plain; charset=utf-8")
        .body(Body::from(body.into()))
        .map_err(Box::new)?;

    Ok(response)
}

/// Create a `text/calendar` response served inline as `<name>.ics`.
pub fn calendar_response(name: &str, ics: String) -> Result<Response<Body>, lambda_http::Error> {
    let response = Response::builder()
        .status(200)
        .header("content-type", "text/calendar")
        .header(
            "content-disposition",
            format!("inline; filename=\"{}.ics\"", quoted_filename(name)),
        )
        .body(Body::from(ics))
        .map_err(Box::new)?;

    Ok(response)
}

/// Replace characters that cannot appear inside a quoted header parameter.
fn quoted_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
