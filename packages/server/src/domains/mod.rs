// Domain modules

pub mod conversations;
pub mod matching;
pub mod profiles;
