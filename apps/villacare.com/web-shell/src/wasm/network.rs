use super::*;

/// Posts forms as multipart bodies with `fetch`.
#[derive(Debug, Default)]
pub(super) struct GlooFormTransport;

#[async_trait(?Send)]
impl FormTransport for GlooFormTransport {
    async fn submit(&self, request: SubmitRequest) -> Result<SubmitResponse, SubmitError> {
        let body = FormData::new()
            .map_err(|_| SubmitError::Build("failed to create form data".to_string()))?;
        for (name, value) in request.payload.fields() {
            body.append_with_str(name, value).map_err(|_| {
                SubmitError::Build(format!("failed to append form field {name}"))
            })?;
        }

        let mut builder = Request::post(&request.endpoint);
        if let Some(token) = request.csrf_token.as_deref() {
            builder = builder.header(&request.csrf_header_name, token);
        }
        let response = builder
            .body(body)
            .map_err(|error| SubmitError::Build(error.to_string()))?
            .send()
            .await
            .map_err(|error| SubmitError::Network(error.to_string()))?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|error| SubmitError::Network(error.to_string()))?;
        debug!(
            form = request.kind.as_str(),
            status,
            bytes = raw.len(),
            "form endpoint replied"
        );
        decode_submit_response(status, &raw)
    }
}
