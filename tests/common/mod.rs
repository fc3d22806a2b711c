use chained_hash::logger;

pub fn init_test_logger() {
    logger::initialize_logger();
}
