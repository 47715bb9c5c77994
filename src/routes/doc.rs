use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        admin::{Dashboard, DashboardStats, SalesPeriod, SalesSeries, TopProduct},
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::{AddToCartRequest, CartLineDto, CartView, UpdateCartRequest},
        catalog::{
            CategoryView, HomePage, ProductDetail, ProductFilters, ProductIndex, ProductView,
            VariantView,
        },
        orders::{CheckoutPreview, CheckoutRequest, OrderList, OrderWithItems},
        products::{
            AdminProductDetail, CreateProductRequest, CreateVariantRequest, ProductList,
            UpdateProductRequest,
        },
    },
    i18n::Locale,
    models::{
        Address, CartItem, Category, Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus,
        Product, ProductDetails, ProductVariant, ShippingMethod, User,
    },
    pricing::OrderSummary,
    response::{ApiResponse, Meta},
    routes::{admin, auth, cart, health, orders, params, products},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        products::home,
        products::list_products,
        products::show_product,
        cart::cart_list,
        cart::add_to_cart,
        cart::update_cart_item,
        cart::remove_from_cart,
        orders::checkout_preview,
        orders::checkout,
        orders::list_orders,
        orders::get_order,
        admin::dashboard,
        admin::list_products,
        admin::create_product,
        admin::get_product,
        admin::update_product,
        admin::delete_product,
        admin::add_variant
    ),
    components(
        schemas(
            User,
            Category,
            Product,
            ProductVariant,
            CartItem,
            Order,
            OrderItem,
            Address,
            ProductDetails,
            OrderStatus,
            PaymentStatus,
            PaymentMethod,
            ShippingMethod,
            Locale,
            OrderSummary,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            HomePage,
            ProductIndex,
            ProductDetail,
            ProductView,
            CategoryView,
            VariantView,
            ProductFilters,
            AddToCartRequest,
            UpdateCartRequest,
            CartLineDto,
            CartView,
            CheckoutRequest,
            CheckoutPreview,
            OrderList,
            OrderWithItems,
            CreateProductRequest,
            UpdateProductRequest,
            CreateVariantRequest,
            ProductList,
            AdminProductDetail,
            Dashboard,
            DashboardStats,
            SalesSeries,
            SalesPeriod,
            TopProduct,
            params::Pagination,
            params::ProductStatus,
            health::HealthStatus,
            Meta,
            ApiResponse<HomePage>,
            ApiResponse<ProductIndex>,
            ApiResponse<ProductDetail>,
            ApiResponse<CartView>,
            ApiResponse<CartItem>,
            ApiResponse<CheckoutPreview>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<Dashboard>,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<AdminProductDetail>,
            ApiResponse<ProductVariant>,
            ApiResponse<User>,
            ApiResponse<LoginResponse>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Catalog", description = "Storefront catalog"),
        (name = "Cart", description = "Cart endpoints, scoped to the user or x-session-id"),
        (name = "Orders", description = "Checkout and order history"),
        (name = "Admin", description = "Admin dashboard and catalog management"),
        (name = "Auth", description = "Authentication endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
