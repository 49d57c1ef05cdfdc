/// Chat invocation - Gateway
mod invoker;

pub use invoker::chat;
