//! Checkout module.
//!
//! Contains the checkout sequencer, the shipping and payment forms it
//! validates, and the order types exchanged with the order service.

mod flow;
pub mod order;
mod payment;
mod shipping;
mod validation;

pub use flow::{
    place_order, CheckoutError, CheckoutSequencer, CheckoutState, CheckoutStep, Navigation,
    SubmissionId, SubmissionTicket, SubmitOutcome,
};
pub use order::{
    CreateOrderRequest, OrderErrorCode, OrderFailure, OrderHistory, OrderLine, OrderPage,
    OrderReceipt, OrderService, OrderStatus, OrderSummary, Pagination,
};
pub use payment::{PaymentField, PaymentForm, PaymentInfo, PaymentMethod};
pub use shipping::{is_valid_email, ShippingField, ShippingForm, ShippingInfo};
pub use validation::{FormField, ValidationErrors};
