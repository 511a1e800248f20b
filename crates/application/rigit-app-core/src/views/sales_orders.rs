use rigit_core::{EntityKind, SalesOrder, SalesOrderStatus};
use rigit_infra::Endpoint;

use crate::dispatcher::{Action, ActionError};
use crate::ports::UserNotice;
use crate::topics::Topic;
use crate::view::{reply_str, EntityView, ViewSpec};

#[derive(Debug, Clone, Copy, Default)]
pub struct SalesOrders;

impl ViewSpec for SalesOrders {
    type Item = SalesOrder;

    const KIND: EntityKind = EntityKind::SalesOrder;

    fn list_endpoint(&self) -> Endpoint {
        Endpoint::sales_orders()
    }

    fn refresh_topics(&self) -> &'static [Topic] {
        &[
            Topic::QuotationApproved,
            Topic::ContractApproved,
            Topic::StockDataRefresh,
            Topic::RefreshAll,
            Topic::GlobalRefresh,
        ]
    }
}

pub type SalesOrdersView = EntityView<SalesOrders>;

impl EntityView<SalesOrders> {
    /// Asks the warehouse whether every item is in stock. Returns the answer
    /// and records it on the row.
    pub async fn check_stock(&self, order_id: &str) -> Result<bool, ActionError> {
        let action = Action::put("Check stock", Endpoint::order_check_stock(order_id));
        let reply = self.run_action(Some(order_id), action).await?;
        let available = reply
            .get("stock_available")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);

        self.context().dispatcher.notify(if available {
            UserNotice::success("Stock check", "All items are in stock!")
        } else {
            UserNotice::warning("Stock check", "Some items are out of stock")
        });

        self.reload().await;
        // Keep the answer even if the list lags behind the check.
        self.update_row(order_id, |order| {
            order.stock_checked = true;
            order.stock_available = Some(available);
        });
        self.publish(Topic::StockDataRefresh, None);
        Ok(available)
    }

    /// Requests a contract for an approved, stock-checked order. The request
    /// then waits for admin approval.
    pub async fn create_contract(&self, order_id: &str) -> Result<Option<String>, ActionError> {
        let blocker = match self.find(order_id) {
            Some(order) => order.contract_blocker().map(ActionError::NotAllowed),
            None => Some(self.missing_row(order_id)),
        };
        let action = Action::put("Create contract", Endpoint::order_create_contract(order_id))
            .requires(blocker.map_or(Ok(()), Err))
            .on_success("Contract request sent for admin approval.");
        let reply = self.run_action(Some(order_id), action).await?;
        let contract_id = reply_str(&reply, "contract_id");

        self.update_row(order_id, |order| {
            order.status = SalesOrderStatus::PendingContractApproval;
            order.contract_id = contract_id.clone();
        });
        self.reload().await;
        self.publish(Topic::RefreshAll, None);
        Ok(contract_id)
    }
}
