/// Identity and session store.
pub mod account_service;
/// Game catalog store.
pub mod game_service;
