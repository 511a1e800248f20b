use rigit_core::{ApprovalStatus, Contract, ContractPatch, ContractStatus, EntityKind};
use rigit_infra::Endpoint;
use serde_json::json;

use crate::dispatcher::{Action, ActionError};
use crate::ports::UserNotice;
use crate::topics::Topic;
use crate::view::{reply_str, EntityView, ViewSpec};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContractScope {
    /// Contract requests waiting for admin approval.
    #[default]
    PendingApproval,
    All,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Contracts {
    pub scope: ContractScope,
}

impl ViewSpec for Contracts {
    type Item = Contract;

    const KIND: EntityKind = EntityKind::Contract;

    fn list_endpoint(&self) -> Endpoint {
        match self.scope {
            ContractScope::PendingApproval => Endpoint::pending_contracts(),
            ContractScope::All => Endpoint::contracts(),
        }
    }

    fn refresh_topics(&self) -> &'static [Topic] {
        &[Topic::ContractApproved, Topic::RefreshAll, Topic::GlobalRefresh]
    }
}

pub type ContractsView = EntityView<Contracts>;

impl EntityView<Contracts> {
    /// Approves a contract request. The backend activates the contract and
    /// raises an invoice, whose id is returned.
    pub async fn approve(&self, contract_id: &str) -> Result<Option<String>, ActionError> {
        let action = Action::put("Approve contract", Endpoint::contract_approve(contract_id));
        let reply = self.run_action(Some(contract_id), action).await?;
        let invoice_id = reply_str(&reply, "invoice_id");
        let message = match &invoice_id {
            Some(invoice) => format!(
                "{contract_id} has been approved and activated. Invoice {invoice} created for finance."
            ),
            None => format!("{contract_id} has been approved and activated."),
        };
        self.context()
            .dispatcher
            .notify(UserNotice::success("Contract approved", message));

        let mut sales_order_id = reply_str(&reply, "sales_order_id");
        self.update_row(contract_id, |c| {
            c.approval_status = ApprovalStatus::Approved;
            c.status = ContractStatus::Active;
            if invoice_id.is_some() {
                c.invoice_id = invoice_id.clone();
            }
            if sales_order_id.is_none() {
                sales_order_id = c.sales_order_id.clone();
            }
        });
        self.reload().await;
        self.publish(
            Topic::ContractApproved,
            Some(json!({
                "contract_id": contract_id,
                "invoice_id": invoice_id,
                "sales_order_id": sales_order_id,
            })),
        );
        self.publish(Topic::StockDataRefresh, None);
        Ok(invoice_id)
    }

    /// Rejects a contract request; the sales order goes back to `approved`.
    pub async fn reject(&self, contract_id: &str) -> Result<(), ActionError> {
        let action = Action::put("Reject contract", Endpoint::contract_reject(contract_id))
            .on_success(format!("Contract {contract_id} rejected."));
        self.run_action(Some(contract_id), action).await?;

        self.update_row(contract_id, |c| {
            c.approval_status = ApprovalStatus::Rejected;
            c.status = ContractStatus::Cancelled;
        });
        self.reload().await;
        self.publish(Topic::RefreshAll, None);
        Ok(())
    }

    pub async fn edit(&self, contract_id: &str, patch: &ContractPatch) -> Result<(), ActionError> {
        let body = serde_json::to_value(patch).unwrap_or_default();
        let action = Action::put("Update contract", Endpoint::contract(contract_id))
            .requires(patch.validate())
            .body(body)
            .on_success(format!("Contract {contract_id} updated."));
        self.run_action(Some(contract_id), action).await?;

        self.update_row(contract_id, |c| patch.apply_to(c));
        self.reload().await;
        self.publish(Topic::RefreshAll, None);
        Ok(())
    }

    pub async fn delete(&self, contract_id: &str) -> Result<(), ActionError> {
        let action = Action::delete("Delete contract", Endpoint::contract(contract_id))
            .on_success(format!("Contract {contract_id} deleted."));
        self.run_action(Some(contract_id), action).await?;

        self.remove_row(contract_id);
        self.reload().await;
        self.publish(Topic::RefreshAll, None);
        Ok(())
    }
}
