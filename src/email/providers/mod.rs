pub mod null;
pub mod sendgrid;
