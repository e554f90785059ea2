mod helpers;
mod record_test;
mod report_test;
mod router_test;
