use chrono::Local;
use rigit_core::{EntityKind, Quotation, QuotationDraft, QuotationSeed, QuotationStatus};
use rigit_infra::Endpoint;
use serde_json::json;
use tracing::warn;

use crate::dispatcher::{Action, ActionError};
use crate::topics::Topic;
use crate::view::{reply_str, EntityView, ViewSpec};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuotationScope {
    /// The sales team's own quotations.
    #[default]
    Sales,
    /// Quotations waiting in the admin approval queue.
    PendingApproval,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Quotations {
    pub scope: QuotationScope,
}

impl ViewSpec for Quotations {
    type Item = Quotation;

    const KIND: EntityKind = EntityKind::Quotation;

    fn list_endpoint(&self) -> Endpoint {
        match self.scope {
            QuotationScope::Sales => Endpoint::sales_quotations(),
            QuotationScope::PendingApproval => Endpoint::pending_quotations(),
        }
    }

    fn refresh_topics(&self) -> &'static [Topic] {
        &[
            Topic::QuotationSent,
            Topic::QuotationApproved,
            Topic::RefreshAll,
            Topic::GlobalRefresh,
        ]
    }
}

pub type QuotationsView = EntityView<Quotations>;

impl EntityView<Quotations> {
    pub fn draft_from_seed(&self, seed: &QuotationSeed) -> QuotationDraft {
        QuotationDraft::from_seed(seed)
    }

    /// Creates the quotation as `sent`. A linked enquiry is then moved to
    /// `quotation_created`; failing that step does not fail the quotation.
    pub async fn create(&self, draft: &QuotationDraft) -> Result<Option<String>, ActionError> {
        let settings = &self.context().settings;
        let today = Local::now().date_naive();
        let action = Action::post("Create quotation", Endpoint::sales_quotations())
            .requires(draft.validate())
            .body(draft.to_payload(today, settings.quotation_validity_days))
            .on_success(format!("Quotation for {} has been created.", draft.customer_name));
        let reply = self.run_action(None, action).await?;
        let quotation_id = reply_str(&reply, "quotation_id").or_else(|| reply_str(&reply, "id"));

        if let Some(enquiry_id) = &draft.enquiry_id {
            let body = json!({ "status": "quotation_created" });
            if let Err(e) = self
                .context()
                .client()
                .put(&Endpoint::enquiry_status(enquiry_id), Some(&body))
                .await
            {
                warn!(%enquiry_id, "could not mark enquiry as quoted: {e}");
            }
        }

        self.reload().await;
        self.publish(Topic::RefreshEnquiries, None);
        Ok(quotation_id)
    }

    /// Submits a quotation to the admin approval queue.
    pub async fn send(&self, quotation_id: &str) -> Result<(), ActionError> {
        let action = Action::put("Send quotation", Endpoint::quotation_send(quotation_id))
            .on_success(format!(
                "Quotation {quotation_id} has been sent to Admin Contract Oversight for approval"
            ));
        self.run_action(Some(quotation_id), action).await?;

        self.update_row(quotation_id, |q| q.status = QuotationStatus::Sent);
        self.reload().await;
        // The approval queue is a separate view of the same rows.
        self.publish(Topic::QuotationSent, Some(json!({ "quotation_id": quotation_id })));
        Ok(())
    }

    /// Approves a quotation; the backend raises a sales order and returns its id.
    pub async fn approve(&self, quotation_id: &str) -> Result<Option<String>, ActionError> {
        let action = Action::put("Approve quotation", Endpoint::quotation_approve(quotation_id))
            .on_success(format!("Quotation {quotation_id} approved."));
        let reply = self.run_action(Some(quotation_id), action).await?;
        let sales_order_id = reply_str(&reply, "sales_order_id");

        self.update_row(quotation_id, |q| q.status = QuotationStatus::Approved);
        self.reload().await;
        self.publish(
            Topic::QuotationApproved,
            Some(json!({
                "quotation_id": quotation_id,
                "sales_order_id": sales_order_id,
            })),
        );
        Ok(sales_order_id)
    }

    pub async fn reject(&self, quotation_id: &str) -> Result<(), ActionError> {
        let action = Action::put("Reject quotation", Endpoint::quotation_reject(quotation_id))
            .on_success(format!("Quotation {quotation_id} rejected."));
        self.run_action(Some(quotation_id), action).await?;

        self.update_row(quotation_id, |q| q.status = QuotationStatus::Rejected);
        self.reload().await;
        self.publish(Topic::RefreshEnquiries, None);
        Ok(())
    }
}
