mod campaign;
mod server;

pub use self::{
    campaign::{start_campaign, unsubscribe, StartOptions},
    server::run_server,
};
