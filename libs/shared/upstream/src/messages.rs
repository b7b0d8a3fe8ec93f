/// User-facing texts for one upstream resource. The portal UI is Spanish.
#[derive(Debug, Clone, Copy)]
pub struct ResourceMessages {
    /// Short tag used in logs.
    pub resource: &'static str,
    pub auth_expired: &'static str,
    pub forbidden: &'static str,
    pub not_found: &'static str,
    pub server_error: &'static str,
    /// Appended to `Error <code>: ` when the status has no bucket and the
    /// upstream gave no message.
    pub request_failed: &'static str,
    /// Used when the transport status is not successful and the body has
    /// no message.
    pub transport_failed: &'static str,
    pub no_payload: &'static str,
}

pub const SESSION_EXPIRED: &str = "Tu sesión ha expirado. Por favor, inicia sesión nuevamente.";
pub const FORBIDDEN: &str = "No tienes permiso para acceder a esta información.";
pub const SERVER_ERROR: &str =
    "El servidor está experimentando problemas. Por favor, intenta más tarde.";
pub const CONNECTION_FAILED: &str =
    "Error al conectar con el servidor. Por favor, verifica tu conexión.";

impl ResourceMessages {
    pub const fn academic(
        resource: &'static str,
        not_found: &'static str,
        request_failed: &'static str,
        transport_failed: &'static str,
        no_payload: &'static str,
    ) -> Self {
        Self {
            resource,
            auth_expired: SESSION_EXPIRED,
            forbidden: FORBIDDEN,
            not_found,
            server_error: SERVER_ERROR,
            request_failed,
            transport_failed,
            no_payload,
        }
    }
}

pub const GRADES: ResourceMessages = ResourceMessages::academic(
    "grades",
    "No se encontraron calificaciones.",
    "No se pudieron obtener las calificaciones.",
    "Error al obtener las calificaciones",
    "No se recibieron calificaciones válidas",
);

pub const STUDENT_INFO: ResourceMessages = ResourceMessages::academic(
    "student",
    "No se encontró información del estudiante.",
    "No se pudo obtener la información.",
    "Error al obtener la información del estudiante",
    "No se recibió información válida del estudiante",
);

pub const KARDEX: ResourceMessages = ResourceMessages::academic(
    "kardex",
    "No se encontró el kardex.",
    "No se pudo obtener el kardex.",
    "Error al obtener el kardex",
    "Formato de respuesta inválido",
);

pub const SCHEDULE: ResourceMessages = ResourceMessages::academic(
    "schedule",
    "No se encontró el horario.",
    "No se pudo obtener el horario.",
    "Error al obtener horario",
    "Error al validar estructura del horario del API",
);

pub const LOGIN: ResourceMessages = ResourceMessages {
    resource: "login",
    auth_expired: "Las credenciales ingresadas son incorrectas. Por favor, verifica que tu correo electrónico institucional y contraseña sean correctos.",
    forbidden: "No tienes permiso para acceder al sistema. Contacta al administrador.",
    not_found: "Usuario no encontrado en el sistema.",
    server_error: SERVER_ERROR,
    request_failed: "No se pudo completar el inicio de sesión.",
    transport_failed: "Error al iniciar sesión",
    no_payload: "No se recibió un token de autenticación válido",
};
