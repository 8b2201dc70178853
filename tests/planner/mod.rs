mod tests_mapping;
