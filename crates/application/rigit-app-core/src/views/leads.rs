use rigit_core::{
    EntityKind, Lead, LeadDraft, LeadStatus, PublicEnquiryForm, PublicEnquiryReceipt,
    RequiredFields,
};
use rigit_infra::Endpoint;
use serde_json::{json, Value};

use crate::dispatcher::{Action, ActionError};
use crate::topics::Topic;
use crate::view::{reply_str, EntityView, ViewSpec};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LeadScope {
    /// Leads assigned to the signed-in salesperson.
    #[default]
    Assigned,
    /// Every lead (CRM admin).
    All,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Leads {
    pub scope: LeadScope,
}

impl ViewSpec for Leads {
    type Item = Lead;

    const KIND: EntityKind = EntityKind::Lead;

    fn list_endpoint(&self) -> Endpoint {
        match self.scope {
            LeadScope::Assigned => Endpoint::assigned_leads(),
            LeadScope::All => Endpoint::leads(),
        }
    }

    fn refresh_topics(&self) -> &'static [Topic] {
        &[
            Topic::LeadCreated,
            Topic::LeadUpdated,
            Topic::RefreshLeads,
            Topic::RefreshAll,
            Topic::GlobalRefresh,
        ]
    }
}

pub type LeadsView = EntityView<Leads>;

impl EntityView<Leads> {
    pub async fn set_status(&self, lead_id: &str, status: LeadStatus) -> Result<(), ActionError> {
        let action = Action::put("Update lead status", Endpoint::lead_status(lead_id))
            .requires(RequiredFields::new().text("lead_id", lead_id).check())
            .body(json!({ "status": status.as_str() }))
            .on_success(format!("Lead status updated to {}.", status.as_str()));
        self.run_action(Some(lead_id), action).await?;

        let raw = status.as_str().to_string();
        self.update_row(lead_id, |lead| lead.status = status);
        self.reload().await;
        self.publish(
            Topic::LeadUpdated,
            Some(json!({ "lead_id": lead_id, "status": raw })),
        );
        self.publish(Topic::RefreshLeads, None);
        Ok(())
    }

    /// CRM manual entry. Returns the new lead id when the backend reports one.
    pub async fn create(&self, draft: &LeadDraft) -> Result<Option<String>, ActionError> {
        let body = serde_json::to_value(draft).unwrap_or_default();
        let action = Action::post("Create lead", Endpoint::leads())
            .requires(draft.validate())
            .body(body)
            .on_success(format!("{} has been added to the CRM.", draft.first_name));
        let reply = self.run_action(None, action).await?;

        let lead_id = reply_str(&reply, "lead_id").or_else(|| reply_str(&reply, "id"));
        if let Ok(lead) = serde_json::from_value::<Lead>(reply) {
            if !lead.lead_id.is_empty() {
                self.upsert_row(lead);
            }
        }
        self.reload().await;
        self.publish(Topic::LeadCreated, Some(json!({ "lead_id": lead_id })));
        self.publish(Topic::RefreshLeads, None);
        Ok(lead_id)
    }

    /// Landing page submission. Sent without a credential; the backend
    /// creates both a lead and an enquiry. The created notifications go out
    /// after the configured dispatch delay.
    pub async fn submit_public_enquiry(
        &self,
        form: &PublicEnquiryForm,
    ) -> Result<PublicEnquiryReceipt, ActionError> {
        let action = Action::post("Submit enquiry", Endpoint::public_lead())
            .requires(form.validate())
            .body(form.to_payload())
            .on_success("Thank you! Your enquiry has been submitted. We will contact you shortly.");
        let reply = self.run_action(None, action).await?;
        let receipt = receipt_from(reply);

        tokio::time::sleep(self.context().settings.dispatch_delay()).await;
        let payload = json!({
            "enquiry_id": receipt.enquiry_id,
            "lead_id": receipt.lead_id,
        });
        self.publish(Topic::EnquiryCreated, Some(payload.clone()));
        self.publish(Topic::LeadCreated, Some(payload));
        Ok(receipt)
    }
}

fn receipt_from(reply: Value) -> PublicEnquiryReceipt {
    serde_json::from_value(reply).unwrap_or_default()
}
