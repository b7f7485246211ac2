pub mod customer_dtos;
