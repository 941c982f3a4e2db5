//! Stripe credentials and hosted checkout redirect targets.
use std::{env::var, sync::LazyLock};

use super::secrets::read_secret;

pub static STRIPE_SECRET_KEY: LazyLock<String> = LazyLock::new(|| {
    var("STRIPE_SECRET_KEY").unwrap_or_else(|_| {
        let secret_path = var("STRIPE_SECRET_KEY_DOCKER_SECRET").expect(
            "Neither STRIPE_SECRET_KEY nor STRIPE_SECRET_KEY_DOCKER_SECRET provided in environment variables"
        );
        read_secret(&secret_path).expect("Failed to read STRIPE_SECRET_KEY docker secret")
    })
});

pub static STRIPE_WEBHOOK_SECRET: LazyLock<String> = LazyLock::new(|| {
    var("STRIPE_WEBHOOK_SECRET").unwrap_or_else(|_| {
        let secret_path = var("STRIPE_WEBHOOK_SECRET_DOCKER_SECRET").expect(
            "Neither STRIPE_WEBHOOK_SECRET nor STRIPE_WEBHOOK_SECRET_DOCKER_SECRET provided in environment variables"
        );
        read_secret(&secret_path).expect("Failed to read STRIPE_WEBHOOK_SECRET docker secret")
    })
});

/// Where the hosted checkout page sends the customer after a successful payment.
pub static CHECKOUT_SUCCESS_URL: LazyLock<String> = LazyLock::new(|| {
    var("CHECKOUT_SUCCESS_URL").expect("CHECKOUT_SUCCESS_URL not provided in environment variables")
});

/// Where the hosted checkout page sends the customer when they abandon payment.
pub static CHECKOUT_CANCEL_URL: LazyLock<String> = LazyLock::new(|| {
    var("CHECKOUT_CANCEL_URL").expect("CHECKOUT_CANCEL_URL not provided in environment variables")
});
