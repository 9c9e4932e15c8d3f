pub mod login_template;

pub use login_template::LoginTemplate;
