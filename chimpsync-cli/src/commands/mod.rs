pub mod sync_orders;
