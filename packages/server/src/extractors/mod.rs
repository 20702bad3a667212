pub mod post_form;
