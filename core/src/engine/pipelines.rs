// cartkeep/src/engine/pipelines.rs

//! Step lists for each cart operation.

use crate::catalog::CatalogReader;
use crate::engine::context::MutationCtx;
use crate::engine::steps;
use crate::error::CartError;
use crate::pipeline::{ContextData, Pipeline, SkipCondition};
use crate::store::CartStore;
use std::sync::Arc;

pub type CartPipeline = Pipeline<MutationCtx, CartError>;

pub fn get_or_create_cart_pipeline(store: Arc<dyn CartStore>) -> CartPipeline {
  let mut p = CartPipeline::new("get_or_create_cart", &[("load_cart", None), ("create_empty_cart", None)]);

  let s = store.clone();
  p.on_step("load_cart", move |ctx| steps::load_cart_or_continue(s.clone(), ctx));
  p.on_step("create_empty_cart", move |ctx| steps::create_empty_cart(store.clone(), ctx));
  p
}

pub fn add_item_pipeline(catalog: Arc<dyn CatalogReader>, store: Arc<dyn CartStore>) -> CartPipeline {
  let mut p = CartPipeline::new(
    "add_item",
    &[
      ("validate_quantity", None),
      ("lookup_product", None),
      ("check_requested_stock", None),
      ("load_or_create_cart", None),
      ("merge_line_item", None),
      ("persist_cart", None),
    ],
  );

  p.on_step("validate_quantity", steps::validate_add_input);
  p.on_step("lookup_product", move |ctx| steps::lookup_product(catalog.clone(), ctx));
  p.on_step("check_requested_stock", steps::check_stock);
  let s = store.clone();
  p.on_step("load_or_create_cart", move |ctx| steps::load_or_create_cart(s.clone(), ctx));
  p.on_step("merge_line_item", steps::merge_line_item);
  p.on_step("persist_cart", move |ctx| steps::persist_cart(store.clone(), ctx));
  p
}

pub fn update_item_quantity_pipeline(catalog: Arc<dyn CatalogReader>, store: Arc<dyn CartStore>) -> CartPipeline {
  // Setting a line to zero is a removal; stock is irrelevant then.
  let removing: SkipCondition<MutationCtx> = Arc::new(|ctx: ContextData<MutationCtx>| {
    let quantity = ctx.read().quantity;
    quantity == 0
  });

  let mut p = CartPipeline::new(
    "update_item_quantity",
    &[
      ("validate_quantity", None),
      ("load_cart", None),
      ("locate_item", None),
      ("lookup_product", Some(removing.clone())),
      ("check_target_stock", Some(removing)),
      ("apply_quantity", None),
      ("persist_cart", None),
    ],
  );

  p.on_step("validate_quantity", steps::validate_update_input);
  let s = store.clone();
  p.on_step("load_cart", move |ctx| steps::load_existing_cart(s.clone(), ctx));
  p.on_step("locate_item", steps::locate_item);
  p.on_step("lookup_product", move |ctx| steps::lookup_product(catalog.clone(), ctx));
  p.on_step("check_target_stock", steps::check_stock);
  p.on_step("apply_quantity", steps::apply_quantity);
  p.on_step("persist_cart", move |ctx| steps::persist_cart(store.clone(), ctx));
  p
}

pub fn remove_item_pipeline(store: Arc<dyn CartStore>) -> CartPipeline {
  let mut p = CartPipeline::new(
    "remove_item",
    &[
      ("load_cart", None),
      ("locate_item", None),
      ("drop_line_item", None),
      ("persist_cart", None),
    ],
  );

  let s = store.clone();
  p.on_step("load_cart", move |ctx| steps::load_existing_cart(s.clone(), ctx));
  p.on_step("locate_item", steps::locate_item);
  p.on_step("drop_line_item", steps::drop_line_item);
  p.on_step("persist_cart", move |ctx| steps::persist_cart(store.clone(), ctx));
  p
}
