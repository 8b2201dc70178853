mod tests_plan_document;
mod tests_properties;
