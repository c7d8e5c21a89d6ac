pub mod account_service;
pub use account_service::{
    AccountError, AccountService, LoginResult, ProfileUpdate, ProfileView, RegistrationResult,
    UserSummary,
};

pub mod account_service_impl;
pub use account_service_impl::SeaOrmAccountService;

pub mod order_service;
pub use order_service::{OrderError, OrderItemInput, OrderService};

pub mod order_service_impl;
pub use order_service_impl::SeaOrmOrderService;

pub mod mailer;
pub use mailer::{LogMailer, Mailer, MailerError, SmtpMailer, generate_verification_code};
