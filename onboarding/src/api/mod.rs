pub mod csrf;
pub mod scripted;
pub mod transport;

/// Remote endpoints used by the onboarding pages.
pub mod endpoints {
    pub const VALIDATE_API_KEY: &str = "/validate-api-key";
    pub const VALIDATE_BASIC_INFO: &str = "/validate-basic-info";
    pub const VALIDATE_ORG_INFO: &str = "/validate-org-info";
    pub const GET_LISTS: &str = "/getLists";
    pub const ANALYZE_LIST: &str = "/analyze-list";
    pub const SUBMIT_EMAIL: &str = "/submitEmail";
    pub const ACTIVATE_USER: &str = "/activate-user";
    pub const ORG_INFO_PAGE: &str = "/org-info";
    pub const CONFIRMATION_PAGE: &str = "/confirmation";
}
