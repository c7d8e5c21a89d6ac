pub mod verification {

    /// How long a verification code stays valid after issue.
    pub const CODE_TTL_MINUTES: i64 = 15;

    pub const MAIL_SUBJECT: &str = "Your Foody Verification Code";
}

pub mod auth {

    /// Minimum accepted password length for registration and changes.
    pub const MIN_PASSWORD_LEN: usize = 8;

    /// Session inactivity window in minutes.
    pub const SESSION_TTL_MINUTES: i64 = 60;
}

pub mod cards {

    pub const NUMBER_MIN_LEN: usize = 13;

    pub const NUMBER_MAX_LEN: usize = 19;
}
