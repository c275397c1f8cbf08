//! Payment pipeline: method selection, submission, audit hooks.
//!
//! The method selection handler's success trigger names the submission
//! handler to dispatch next; that handler must itself be registered.
//! Every failure is mirrored to the pay error hook, and a completed
//! payment is additionally announced on the payed hook for audit and
//! analytics collaborators.

use super::Core;
use crate::constants::{handlers, hooks as hook_names};
use crate::results::{Outcome, ResultCode};
use crate::types::{GameOrder, PayRequest};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error};

impl Core {
    /// Run the payment sequence for `order`.
    ///
    /// Requires a logged-in session; otherwise the pay error hook is
    /// published and an unauthenticated outcome returned without
    /// dispatching anything.
    pub async fn pay(self: &Arc<Self>, order: GameOrder, params: Value) -> Outcome {
        let Some(user) = self.user() else {
            self.hooks().publish(
                hook_names::ERR_PAY,
                &Outcome::error(ResultCode::Unauthenticated, "pay", json!(order)),
            );
            return Outcome::error(ResultCode::Unauthenticated, "user.null", json!("not login"));
        };

        let request = PayRequest {
            order,
            params,
            user,
        };
        let selected = self
            .handlers()
            .call(handlers::PAY_METHODS, request.to_value())
            .await;
        if !selected.is_success() {
            error!(trigger = %selected.trigger, "get payment methods failed");
            debug!(payload = %selected.payload, "get payment response");
            self.hooks().publish(hook_names::ERR_PAY, &selected);
            return selected;
        }

        // the selection's trigger names the submission handler
        let method = selected.trigger.clone();
        debug!(method = %method, "pay with handler");
        let Some(submit) = self.handlers().get(&method) else {
            let missing = Outcome::error(
                ResultCode::HandlerNotFound,
                "pay.methods",
                serde_json::to_value(&selected).unwrap_or(Value::Null),
            );
            error!(method = %method, "pay handler not found");
            self.hooks().publish(hook_names::ERR_PAY, &missing);
            return missing;
        };

        let submission = request.submission(selected.payload);
        let outcome = submit.call(submission.clone()).await;
        if outcome.is_success() {
            self.hooks().publish(
                hook_names::PAYED,
                &Outcome::success(
                    outcome.trigger.clone(),
                    json!({
                        "request": submission,
                        "response": outcome.payload,
                    }),
                ),
            );
        } else {
            self.hooks().publish(hook_names::ERR_PAY, &outcome);
        }
        outcome
    }
}
