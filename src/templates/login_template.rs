use askama::Template;

use crate::config::CSRF_PARAM;
use crate::models::AppState;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub login_processing_url: String,
    pub username_param: String,
    pub password_param: String,
    pub csrf_param: &'static str,
    pub csrf_token: Option<String>,
    pub error: Option<String>,
    pub notice: Option<String>,
}

impl LoginTemplate {
    pub fn new(state: &AppState, csrf_token: Option<String>) -> Self {
        Self {
            login_processing_url: state.config.login_processing_url.clone(),
            username_param: state.config.username_param.clone(),
            password_param: state.config.password_param.clone(),
            csrf_param: CSRF_PARAM,
            csrf_token,
            error: None,
            notice: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_notice(mut self, notice: impl Into<String>) -> Self {
        self.notice = Some(notice.into());
        self
    }
}
