mod helpers;
mod list_test;
mod router_test;
