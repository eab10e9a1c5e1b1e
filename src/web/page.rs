//! Page interaction capabilities for the embedded browser
//!
//! The login flow sometimes has to reach into the remote login page:
//! MDM-provisioned credentials are injected into the login form, and the
//! parent-app pairing flow clicks through to a self-registration dialog.
//! The CSS selectors involved are server-version-dependent, so the scripts
//! live behind the [`PageAdapter`] capability and the concrete selector
//! list is confined to [`CanvasPageAdapter`].

/// Device-management-supplied credentials pre-filled into the login form.
/// `host` scopes the credentials to one institution; they are injected
/// only on a login page for that host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MdmLogin {
    pub host: String,
    pub username: String,
    pub password: String,
}

/// A scripted action to run against the loaded page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageAction {
    /// Fill and submit the login form with MDM credentials.
    PrefillLogin(String),
    /// Open the self-registration dialog and enter the pairing code.
    ShowSelfRegistration(String),
}

impl PageAction {
    /// The script to evaluate in the page, regardless of intent.
    #[must_use]
    pub fn script(&self) -> &str {
        match self {
            Self::PrefillLogin(script) | Self::ShowSelfRegistration(script) => script,
        }
    }
}

/// Produces the scripts injected into the remote login page.
pub trait PageAdapter {
    fn prefill_login_script(&self, login: &MdmLogin) -> String;
    fn self_registration_script(&self, pairing_code: &str) -> String;
}

/// Message-channel name the self-registration script posts to when no
/// registration link can be found on the page.
pub const SELF_REGISTRATION_ERROR_CHANNEL: &str = "selfRegistrationError";

/// Default adapter targeting stock Canvas login pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanvasPageAdapter;

impl PageAdapter for CanvasPageAdapter {
    fn prefill_login_script(&self, login: &MdmLogin) -> String {
        format!(
            "const form = document.querySelector('#login_form')\n\
             form.querySelector('[type=email],[type=text]').value = {}\n\
             form.querySelector('[type=password]').value = {}\n\
             form.submit()",
            js_string(&login.username),
            js_string(&login.password),
        )
    }

    fn self_registration_script(&self, pairing_code: &str) -> String {
        format!(
            "let registerLink = document.querySelector('a#register_link')\n\
             if (registerLink) {{ registerLink.click() }} else {{\n\
               let enrollLink = document.querySelector('a[data-template=\"newParentDialog\"]')\n\
                 || document.querySelector('#coenrollment_link a')\n\
                 || document.querySelector('a#signup_parent')\n\
               if (!enrollLink) {{\n\
                 window.webkit.messageHandlers.{SELF_REGISTRATION_ERROR_CHANNEL}.postMessage('')\n\
               }} else {{\n\
                 enrollLink.click()\n\
                 document.querySelector('input#pairing_code').value = {}\n\
               }}\n\
             }}",
            js_string(pairing_code),
        )
    }
}

/// Escape a string for safe embedding in an injected script.
#[must_use]
pub fn js_string(value: &str) -> String {
    // JSON string syntax is valid JavaScript string syntax.
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

/// Authentication scheme of an HTTP auth challenge raised mid-flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    HttpBasic,
    Ntlm,
    Other,
}

/// Username/password pair collected from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// How the host browser should answer an auth challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChallengeDisposition {
    UseCredential(Credentials),
    PerformDefaultHandling,
}

/// Synchronous credential prompt shown for Basic/NTLM challenges.
/// Returning `None` means the user cancelled the prompt.
pub trait CredentialPrompt {
    fn prompt(&self) -> Option<Credentials>;
}
