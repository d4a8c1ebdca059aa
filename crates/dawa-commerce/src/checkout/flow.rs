//! Checkout flow state machine.

use super::order::{CreateOrderRequest, OrderFailure, OrderReceipt, OrderService};
use super::payment::{PaymentField, PaymentForm, PaymentInfo};
use super::shipping::{ShippingField, ShippingForm, ShippingInfo};
use super::validation::ValidationErrors;
use crate::cart::{CartSnapshot, CartStore, DeliveryPricing};
use crate::ids::UserId;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;

/// Steps in the checkout flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutStep {
    /// Delivery address and contact details.
    Shipping,
    /// Payment method.
    Payment,
    /// Order review before submission.
    Confirmation,
    /// Order accepted by the API.
    Placed,
}

impl CheckoutStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStep::Shipping => "shipping",
            CheckoutStep::Payment => "payment",
            CheckoutStep::Confirmation => "confirmation",
            CheckoutStep::Placed => "placed",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CheckoutStep::Shipping => "Shipping",
            CheckoutStep::Payment => "Payment",
            CheckoutStep::Confirmation => "Confirmation",
            CheckoutStep::Placed => "Order Placed",
        }
    }

    /// Get the step number (1-indexed). `Placed` shares the confirmation slot.
    pub fn number(&self) -> u8 {
        match self {
            CheckoutStep::Shipping => 1,
            CheckoutStep::Payment => 2,
            CheckoutStep::Confirmation | CheckoutStep::Placed => 3,
        }
    }
}

/// Where the shopper goes after a placed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    ViewOrders,
    ContinueShopping,
}

/// Errors from driving the checkout flow.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("Your cart is empty")]
    EmptyCart,

    #[error("Cannot {action} during the {from} step")]
    InvalidTransition {
        from: &'static str,
        action: &'static str,
    },

    #[error("Please correct the shipping details: {0}")]
    Shipping(ValidationErrors<ShippingField>),

    #[error("Please correct the payment details: {0}")]
    Payment(ValidationErrors<PaymentField>),

    #[error("Please accept the terms and conditions to place your order")]
    TermsNotAccepted,

    #[error("An order submission is already in progress")]
    SubmissionInFlight,

    #[error("Submission {0} is not the one in flight")]
    StaleSubmission(u64),

    #[error("Checkout session has ended")]
    SessionEnded,
}

/// Identifier of one order-creation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmissionId(u64);

impl SubmissionId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Everything needed to perform one order call, taken when the submission
/// begins. Later cart changes cannot alter it.
#[derive(Debug, Clone)]
pub struct SubmissionTicket {
    pub id: SubmissionId,
    pub request: CreateOrderRequest,
    pub order_items: CartSnapshot,
}

/// Current state; each variant carries the data valid in it.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutState {
    Shipping,
    Payment {
        shipping: ShippingInfo,
    },
    Confirmation {
        shipping: ShippingInfo,
        payment: PaymentInfo,
    },
    Placed {
        shipping: ShippingInfo,
        payment: PaymentInfo,
        receipt: OrderReceipt,
        order_items: CartSnapshot,
    },
}

impl CheckoutState {
    pub fn step(&self) -> CheckoutStep {
        match self {
            CheckoutState::Shipping => CheckoutStep::Shipping,
            CheckoutState::Payment { .. } => CheckoutStep::Payment,
            CheckoutState::Confirmation { .. } => CheckoutStep::Confirmation,
            CheckoutState::Placed { .. } => CheckoutStep::Placed,
        }
    }
}

/// Result of [`place_order`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Placed(OrderReceipt),
    Failed(OrderFailure),
    /// Another submission was in flight; nothing was sent.
    AlreadySubmitting,
}

/// The shipping → payment → confirmation wizard.
#[derive(Debug, Clone)]
pub struct CheckoutSequencer {
    state: CheckoutState,
    shipping_draft: ShippingForm,
    payment_draft: PaymentForm,
    in_flight: Option<SubmissionId>,
    next_submission: u64,
    last_error: Option<OrderFailure>,
    user: Option<UserId>,
    ended: bool,
}

impl CheckoutSequencer {
    /// Begin checkout for the given cart contents.
    pub fn start(cart: &CartSnapshot) -> Result<Self, CheckoutError> {
        Self::start_with(cart, ShippingForm::default())
    }

    /// Begin checkout with a pre-filled shipping form (e.g., the signed-in
    /// shopper's name and email).
    pub fn start_with(cart: &CartSnapshot, shipping_draft: ShippingForm) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        tracing::debug!(lines = cart.lines.len(), "checkout started");
        Ok(Self {
            state: CheckoutState::Shipping,
            shipping_draft,
            payment_draft: PaymentForm::default(),
            in_flight: None,
            next_submission: 0,
            last_error: None,
            user: None,
            ended: false,
        })
    }

    /// Attribute the order to a signed-in user.
    pub fn with_user(mut self, user: UserId) -> Self {
        self.user = Some(user);
        self
    }

    pub fn user(&self) -> Option<&UserId> {
        self.user.as_ref()
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    pub fn step(&self) -> CheckoutStep {
        self.state.step()
    }

    /// Last shipping form entered, kept for back navigation.
    pub fn shipping_draft(&self) -> &ShippingForm {
        &self.shipping_draft
    }

    /// Last payment form entered, kept for back navigation.
    pub fn payment_draft(&self) -> &PaymentForm {
        &self.payment_draft
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Failure of the most recent submission, cleared when a new one begins.
    pub fn last_error(&self) -> Option<&OrderFailure> {
        self.last_error.as_ref()
    }

    /// Order number once placed.
    pub fn order_number(&self) -> Option<&str> {
        match &self.state {
            CheckoutState::Placed { receipt, .. } => Some(&receipt.order_number),
            _ => None,
        }
    }

    /// Delivery summary for the given cart, or for the ordered items once placed.
    pub fn pricing(&self, cart: &CartSnapshot) -> DeliveryPricing {
        match &self.state {
            CheckoutState::Placed { order_items, .. } => DeliveryPricing::for_subtotal(order_items.subtotal),
            _ => DeliveryPricing::for_subtotal(cart.subtotal),
        }
    }

    /// Validate shipping details and move on to payment.
    pub fn submit_shipping(&mut self, form: ShippingForm) -> Result<CheckoutStep, CheckoutError> {
        self.ensure_open()?;
        if !matches!(self.state, CheckoutState::Shipping) {
            return Err(self.invalid("submit shipping details"));
        }
        let result = form.validate();
        self.shipping_draft = form;
        let shipping = result.map_err(CheckoutError::Shipping)?;
        self.state = CheckoutState::Payment { shipping };
        Ok(self.step())
    }

    /// Validate payment details and move on to confirmation.
    pub fn submit_payment(&mut self, form: PaymentForm) -> Result<CheckoutStep, CheckoutError> {
        self.ensure_open()?;
        let shipping = match &self.state {
            CheckoutState::Payment { shipping } => shipping.clone(),
            _ => return Err(self.invalid("submit payment details")),
        };
        let result = form.validate();
        self.payment_draft = form;
        let payment = result.map_err(CheckoutError::Payment)?;
        self.state = CheckoutState::Confirmation { shipping, payment };
        Ok(self.step())
    }

    /// Return to the previous step, keeping what was entered.
    pub fn back(&mut self) -> Result<CheckoutStep, CheckoutError> {
        self.ensure_open()?;
        let previous = match &self.state {
            CheckoutState::Payment { .. } => CheckoutState::Shipping,
            CheckoutState::Confirmation { shipping, .. } => {
                if self.in_flight.is_some() {
                    return Err(CheckoutError::SubmissionInFlight);
                }
                CheckoutState::Payment {
                    shipping: shipping.clone(),
                }
            }
            CheckoutState::Shipping | CheckoutState::Placed { .. } => {
                return Err(self.invalid("go back"))
            }
        };
        self.state = previous;
        Ok(self.step())
    }

    /// Claim the single submission slot and build the order request.
    ///
    /// The slot is taken before this returns, so a second call made while the
    /// order call is awaited is refused with [`CheckoutError::SubmissionInFlight`].
    pub fn begin_submission(
        &mut self,
        terms_accepted: bool,
        cart: &CartSnapshot,
    ) -> Result<SubmissionTicket, CheckoutError> {
        self.ensure_open()?;
        let (shipping, payment) = match &self.state {
            CheckoutState::Confirmation { shipping, payment } => (shipping, payment),
            _ => return Err(self.invalid("place the order")),
        };
        if self.in_flight.is_some() {
            return Err(CheckoutError::SubmissionInFlight);
        }
        if !terms_accepted {
            return Err(CheckoutError::TermsNotAccepted);
        }
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let mut request = CreateOrderRequest::new(cart, shipping.clone(), payment.clone());
        if let Some(user) = &self.user {
            request = request.with_user(user.clone());
        }
        let id = SubmissionId(self.next_submission);
        self.next_submission += 1;
        self.in_flight = Some(id);
        self.last_error = None;
        tracing::info!(
            submission = id.0,
            items = request.items.len(),
            total = %request.total,
            "submitting order"
        );
        Ok(SubmissionTicket {
            id,
            request,
            order_items: cart.clone(),
        })
    }

    /// Record the outcome of the order call for `ticket`.
    ///
    /// Success moves to `Placed`; failure keeps `Confirmation` so the shopper
    /// can resubmit without re-entering anything.
    pub fn complete_submission(
        &mut self,
        ticket: SubmissionTicket,
        result: Result<OrderReceipt, OrderFailure>,
    ) -> Result<CheckoutStep, CheckoutError> {
        if self.in_flight != Some(ticket.id) {
            return Err(CheckoutError::StaleSubmission(ticket.id.0));
        }
        self.in_flight = None;

        match result {
            Ok(receipt) => {
                let (shipping, payment) = match &self.state {
                    CheckoutState::Confirmation { shipping, payment } => {
                        (shipping.clone(), payment.clone())
                    }
                    _ => return Err(self.invalid("complete the order")),
                };
                tracing::info!(order_number = %receipt.order_number, "order placed");
                self.state = CheckoutState::Placed {
                    shipping,
                    payment,
                    receipt,
                    order_items: ticket.order_items,
                };
            }
            Err(failure) => {
                tracing::warn!(code = failure.code.as_str(), detail = %failure.detail, "order failed");
                self.last_error = Some(failure);
            }
        }
        Ok(self.step())
    }

    /// Release the submission slot held by `id` without recording an outcome.
    ///
    /// Used when the order call is cancelled before it returns. Returns
    /// `false` if `id` no longer holds the slot.
    pub fn abandon_submission(&mut self, id: SubmissionId) -> bool {
        if self.in_flight != Some(id) {
            return false;
        }
        self.in_flight = None;
        tracing::warn!(submission = id.0, "order submission abandoned");
        true
    }

    /// Leave a placed order. Empties the cart and ends the session.
    pub fn finish(&mut self, navigation: Navigation, cart: &mut CartStore) -> Result<Navigation, CheckoutError> {
        self.ensure_open()?;
        if !matches!(self.state, CheckoutState::Placed { .. }) {
            return Err(self.invalid("leave checkout"));
        }
        cart.clear();
        self.ended = true;
        Ok(navigation)
    }

    fn ensure_open(&self) -> Result<(), CheckoutError> {
        if self.ended {
            Err(CheckoutError::SessionEnded)
        } else {
            Ok(())
        }
    }

    fn invalid(&self, action: &'static str) -> CheckoutError {
        CheckoutError::InvalidTransition {
            from: self.step().as_str(),
            action,
        }
    }
}

/// Submit the order held in `sequencer` through `service`.
///
/// The lock is only held while claiming and releasing the submission slot,
/// never across the order call, so a concurrent second call sees the claimed
/// slot and returns [`SubmitOutcome::AlreadySubmitting`] without calling
/// `service`. If the returned future is dropped mid-call the slot is released.
pub async fn place_order<S>(
    sequencer: &Mutex<CheckoutSequencer>,
    terms_accepted: bool,
    cart: &CartSnapshot,
    service: &S,
    timeout: Option<Duration>,
) -> Result<SubmitOutcome, CheckoutError>
where
    S: OrderService + ?Sized,
{
    let ticket = {
        let mut guard = sequencer.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.begin_submission(terms_accepted, cart) {
            Ok(ticket) => ticket,
            Err(CheckoutError::SubmissionInFlight) => return Ok(SubmitOutcome::AlreadySubmitting),
            Err(e) => return Err(e),
        }
    };
    let mut release = SlotRelease {
        sequencer,
        id: Some(ticket.id),
    };

    let call = service.create_order(&ticket.request);
    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Err(OrderFailure::timed_out(limit)),
        },
        None => call.await,
    };

    let outcome = match &result {
        Ok(receipt) => SubmitOutcome::Placed(receipt.clone()),
        Err(failure) => SubmitOutcome::Failed(failure.clone()),
    };
    release.id = None;
    let mut guard = sequencer.lock().unwrap_or_else(PoisonError::into_inner);
    guard.complete_submission(ticket, result)?;
    Ok(outcome)
}

/// Frees the submission slot if [`place_order`] is cancelled while awaiting
/// the order call.
struct SlotRelease<'a> {
    sequencer: &'a Mutex<CheckoutSequencer>,
    id: Option<SubmissionId>,
}

impl Drop for SlotRelease<'_> {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.sequencer
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .abandon_submission(id);
        }
    }
}
