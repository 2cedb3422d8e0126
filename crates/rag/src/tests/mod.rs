//! Pipeline scenarios with test doubles for every external service.
