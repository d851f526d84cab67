use uuid::Uuid;

use crate::{Customer, EngineError, NewCustomer, ResultEngine, customers, util::normalize_optional_text};

use super::Engine;

impl Engine {
    pub async fn new_customer(&self, new_customer: NewCustomer) -> ResultEngine<Customer> {
        let full_name = new_customer.full_name.trim();
        if full_name.is_empty() {
            return Err(EngineError::InvalidArgument(
                "customer name must not be empty".to_string(),
            ));
        }
        let customer = Customer::new(
            full_name.to_string(),
            normalize_optional_text(new_customer.email.as_deref()),
        );
        customers::insert(&self.database, &customer).await?;
        tracing::info!(customer_id = %customer.id, "customer registered");
        Ok(customer)
    }

    pub async fn customer(&self, customer_id: Uuid) -> ResultEngine<Customer> {
        customers::get_by_id(&self.database, customer_id).await
    }
}
