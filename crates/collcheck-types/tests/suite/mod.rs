mod ancestor_args;
mod declarations;
mod resolver_props;
