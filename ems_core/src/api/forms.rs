//! Form template endpoints.

use super::{
    client::{ApiClient, PendingRequest},
    errors::ApiResult,
};
use crate::forms::{CreateTemplateRequest, FieldOrder, FormBuilder, FormTemplate, FormTemplateId};
use serde::Serialize;

const TEMPLATES_PATH: &str = "/form/templates/";

#[derive(Debug, Serialize)]
struct ReorderRequest<'a> {
    field_orders: &'a [FieldOrder],
}

/// Outcome of [`ApiClient::save_form`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SavedForm {
    Created(FormTemplate),
    Reordered(FormTemplateId),
}

impl ApiClient {
    /// List the templates owned by the signed-in user
    pub async fn list_templates(&self) -> ApiResult<Vec<FormTemplate>> {
        self.send_json(PendingRequest::get(TEMPLATES_PATH)).await
    }

    /// Fetch one template with its fields
    pub async fn get_template(&self, id: FormTemplateId) -> ApiResult<FormTemplate> {
        self.send_json(PendingRequest::get(format!("{TEMPLATES_PATH}{id}/")))
            .await
    }

    /// Create a template
    pub async fn create_template(&self, request: &CreateTemplateRequest) -> ApiResult<FormTemplate> {
        self.send_json(PendingRequest::post(TEMPLATES_PATH, request)?)
            .await
    }

    /// Persist a new field order for a saved template
    pub async fn reorder_fields(
        &self,
        id: FormTemplateId,
        field_orders: &[FieldOrder],
    ) -> ApiResult<()> {
        let request = PendingRequest::post(
            format!("{TEMPLATES_PATH}{id}/reorder_fields/"),
            &ReorderRequest { field_orders },
        )?;
        self.send_empty(request).await
    }

    /// Save the builder: create a new template, or persist the field order
    /// of the saved template it was loaded from.
    ///
    /// # Errors
    ///
    /// * `ApiError::Validation` - Draft isn't savable; nothing sent
    pub async fn save_form(&self, builder: &FormBuilder) -> ApiResult<SavedForm> {
        match builder.template_id() {
            Some(id) => {
                self.reorder_fields(id, &builder.field_orders()).await?;
                Ok(SavedForm::Reordered(id))
            }
            None => {
                let request = builder.to_create_request()?;
                let template = self.create_template(&request).await?;
                Ok(SavedForm::Created(template))
            }
        }
    }
}
