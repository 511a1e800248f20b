use rigit_core::{Enquiry, EnquiryDraft, EnquiryStatus, EntityKind, QuotationSeed};
use rigit_infra::Endpoint;
use serde_json::json;

use crate::dispatcher::{Action, ActionError};
use crate::topics::Topic;
use crate::view::{reply_str, EntityView, ViewSpec};

/// Rental orders and enquiries as the sales team sees them.
#[derive(Debug, Clone, Copy, Default)]
pub struct Enquiries;

impl ViewSpec for Enquiries {
    type Item = Enquiry;

    const KIND: EntityKind = EntityKind::Enquiry;

    fn list_endpoint(&self) -> Endpoint {
        Endpoint::sales_enquiries()
    }

    fn refresh_topics(&self) -> &'static [Topic] {
        &[
            Topic::EnquiryCreated,
            Topic::RefreshEnquiries,
            Topic::RefreshAll,
            Topic::GlobalRefresh,
        ]
    }
}

pub type EnquiriesView = EntityView<Enquiries>;

impl EntityView<Enquiries> {
    /// Admin entry of an enquiry taken by phone or email.
    pub async fn create(&self, draft: &EnquiryDraft) -> Result<Option<String>, ActionError> {
        let action = Action::post("Create enquiry", Endpoint::admin_enquiries())
            .requires(draft.validate())
            .body(draft.to_payload())
            .on_success(format!("Enquiry for {} has been created.", draft.customer_name));
        let reply = self.run_action(None, action).await?;

        let enquiry_id = reply_str(&reply, "enquiry_id");
        self.reload().await;
        let payload = json!({ "enquiry_id": enquiry_id });
        self.publish(Topic::EnquiryCreated, Some(payload.clone()));
        self.publish(Topic::LeadCreated, Some(payload));
        self.publish(Topic::RefreshEnquiries, None);
        Ok(enquiry_id)
    }

    pub async fn update_status(
        &self,
        enquiry_id: &str,
        status: EnquiryStatus,
    ) -> Result<(), ActionError> {
        let action = Action::put("Update enquiry status", Endpoint::enquiry_status(enquiry_id))
            .body(json!({ "status": status.as_str() }))
            .on_success(format!("Enquiry marked as {}.", status.label()));
        self.run_action(Some(enquiry_id), action).await?;

        self.update_row(enquiry_id, |enquiry| enquiry.status = status);
        self.reload().await;
        self.publish(Topic::RefreshEnquiries, None);
        Ok(())
    }

    /// Hands a loaded enquiry to the quotation form. Nothing is sent to the
    /// backend; the seed goes out on `convertToQuotation`.
    pub fn convert_to_quotation(&self, enquiry_id: &str) -> Result<QuotationSeed, ActionError> {
        let Some(enquiry) = self.find(enquiry_id) else {
            let e = self.missing_row(enquiry_id);
            self.context().dispatcher.report("Convert to quotation", &e);
            return Err(e);
        };

        let days = self.context().settings.default_rental_duration_days;
        let seed = enquiry.quotation_seed(days);
        let payload = serde_json::to_value(&seed).unwrap_or_default();
        self.publish(Topic::ConvertToQuotation, Some(payload));
        Ok(seed)
    }
}
