mod descriptor;
mod module_tree;
mod module_trait;
mod var_ops;
