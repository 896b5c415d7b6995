//! User handle trait.

use super::{AttributeEntry, AuthenticateOutcome, Credentials, ProviderResult, ProviderSession};
use std::future::Future;

/// Handle to one account within a user pool.
///
/// Each method is one provider interaction with exactly one settlement
/// point; the callback-to-future adaptation happens behind this trait.
/// None of these retry.
pub trait PoolUser: Send + Sync {
    /// Username this handle addresses.
    fn username(&self) -> String;

    /// Attempt authentication.
    ///
    /// Success is the exhaustive [`AuthenticateOutcome`] union - an issued
    /// session or a challenge requiring further client action.
    ///
    /// # Errors
    ///
    /// The provider's failure callback, verbatim.
    fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = ProviderResult<AuthenticateOutcome>> + Send;

    /// Fetch this user's current session from the provider.
    ///
    /// # Errors
    ///
    /// Returns the provider's error when no valid session can be
    /// produced.
    fn session(&self) -> impl Future<Output = ProviderResult<ProviderSession>> + Send;

    /// Confirm a fresh registration with a delivered code.
    ///
    /// `force_alias_creation` migrates a contested alias (email/phone) to
    /// this account on confirmation.
    ///
    /// # Errors
    ///
    /// Provider error verbatim (wrong code, expired code, ...).
    fn confirm_registration(
        &self,
        code: &str,
        force_alias_creation: bool,
    ) -> impl Future<Output = ProviderResult<()>> + Send;

    /// Ask the provider to resend the confirmation code.
    ///
    /// # Errors
    ///
    /// Provider error verbatim.
    fn resend_confirmation_code(&self) -> impl Future<Output = ProviderResult<()>> + Send;

    /// Start the forgot-password flow (provider delivers a reset code).
    ///
    /// # Errors
    ///
    /// Provider error verbatim.
    fn forgot_password(&self) -> impl Future<Output = ProviderResult<()>> + Send;

    /// Complete the forgot-password flow with the delivered code.
    ///
    /// # Errors
    ///
    /// Provider error verbatim.
    fn confirm_password(
        &self,
        code: &str,
        new_password: &str,
    ) -> impl Future<Output = ProviderResult<()>> + Send;

    /// Change the password of an authenticated user.
    ///
    /// Requires a handle with a restored or live session.
    ///
    /// # Errors
    ///
    /// Provider error verbatim.
    fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> impl Future<Output = ProviderResult<()>> + Send;

    /// Answer a new-password challenge issued during authentication.
    ///
    /// # Errors
    ///
    /// Provider error verbatim; the challenge stays answerable.
    fn complete_new_password_challenge(
        &self,
        new_password: &str,
        attributes: &[AttributeEntry],
    ) -> impl Future<Output = ProviderResult<ProviderSession>> + Send;

    /// Replace attributes on the provider side.
    ///
    /// # Errors
    ///
    /// Provider error verbatim.
    fn update_attributes(
        &self,
        attributes: &[AttributeEntry],
    ) -> impl Future<Output = ProviderResult<()>> + Send;

    /// Fetch this user's attributes.
    ///
    /// # Errors
    ///
    /// Provider error verbatim.
    fn user_attributes(&self) -> impl Future<Output = ProviderResult<Vec<AttributeEntry>>> + Send;

    /// Sign this user out of the local client.
    ///
    /// Clears client-side session material only; the provider gives no
    /// network guarantee, so this cannot fail.
    fn sign_out(&self);
}
